use clap::Parser;

use crate::cli::{usage, Args};
use crate::config::Settings;
use crate::dispatch::{AliasTools, Command};
use crate::errors::{AliasToolError, Result};
use crate::logging;
use crate::reload::{CommandReloader, DirtyMarkers};
use crate::status::ExitStatus;
use crate::store::{ConfigLock, XmlConfigStore};

/// Main entry point for the CLI.
///
/// Parses arguments, prints usage for incomplete commands, and otherwise
/// runs one alias command against the configured store. Command results and
/// rejections go to stdout; operational errors go to stderr.
pub fn run(args: Vec<String>) -> ExitStatus {
    let program = args.first().cloned().unwrap_or_else(|| "aliastool".to_string());

    let parsed = match Args::try_parse_from(&args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion {
                ExitStatus::Success
            } else {
                ExitStatus::ParseError
            };
        }
    };

    logging::init(parsed.verbose, parsed.debug, parsed.log_format.unwrap_or_default());

    let Some((action, alias)) = parsed.command_parts() else {
        print!("{}", usage(&program));
        return ExitStatus::Success;
    };

    match execute(&parsed, action, alias) {
        Ok(status) => status,
        Err(e) if e.is_rejection() => {
            tracing::debug!(error = ?e, "Command rejected");
            println!("{}", e);
            ExitStatus::from_error(&e)
        }
        Err(e) => handle_error(e, parsed.debug),
    }
}

fn execute(args: &Args, action: &str, alias: &str) -> Result<ExitStatus> {
    // Reject a bad action before touching settings, lock or store
    let command = Command::parse(action, alias, args.value.as_deref())?;

    let mut settings = Settings::load(args.settings.as_deref())?;
    if let Some(path) = &args.config_xml {
        settings.config_xml = path.clone();
    }

    let _lock = ConfigLock::acquire(&settings.lock_file, command.action.lock_mode())?;
    let mut store = open_store(&settings)?;
    let mut reloader = CommandReloader::from_argv(&settings.reload_command)?;
    let markers = DirtyMarkers::new(&settings.dirty_dir);

    let response = AliasTools::new(&mut store, &mut reloader, &markers).run(&command)?;
    println!("{}", response);

    if let Some(reason) = response.reload_failure() {
        eprintln!("WARNING: Alias updated but filter reload failed: {}", reason);
        return Ok(ExitStatus::ReloadFailed);
    }
    Ok(ExitStatus::Success)
}

fn open_store(settings: &Settings) -> Result<XmlConfigStore> {
    let store = XmlConfigStore::open(&settings.config_xml, &settings.reserved_names)?;
    Ok(match &settings.backup_dir {
        Some(dir) if settings.backup_count > 0 => store.with_backups(dir, settings.backup_count),
        _ => store,
    })
}

fn handle_error(error: AliasToolError, debug: bool) -> ExitStatus {
    if debug {
        eprintln!("Error: {:?}", error);
    } else {
        eprintln!("Error: {}", error);
    }

    ExitStatus::from_error(&error)
}

//! Firewall rule reload and subsystem dirty markers

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::errors::{AliasToolError, Result};

/// Subsystem whose dirty marker is cleared after a successful reload
pub const ALIASES_SUBSYSTEM: &str = "aliases";

/// Something that recompiles and activates the firewall rule set
pub trait RuleReloader {
    /// Trigger the reload and return its status code (0 = success)
    fn reload(&mut self) -> Result<i32>;
}

/// Runs an external command to reload the rules
#[derive(Debug, Clone)]
pub struct CommandReloader {
    program: String,
    args: Vec<String>,
}

impl CommandReloader {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a `[program, args...]` list
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| AliasToolError::Settings("reload_command must not be empty".into()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl RuleReloader for CommandReloader {
    fn reload(&mut self) -> Result<i32> {
        debug!(program = %self.program, args = ?self.args, "Running rule reload");

        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|e| AliasToolError::Reload(format!("Failed to run {}: {}", self.program, e)))?;

        // Killed by a signal: no exit code
        let code = status.code().unwrap_or(-1);
        info!(program = %self.program, code, "Rule reload finished");
        Ok(code)
    }
}

/// Dirty markers are `<subsystem>.dirty` files in a run directory
#[derive(Debug, Clone)]
pub struct DirtyMarkers {
    dir: PathBuf,
}

impl DirtyMarkers {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn marker(&self, subsystem: &str) -> PathBuf {
        self.dir.join(format!("{}.dirty", subsystem))
    }

    pub fn mark(&self, subsystem: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.marker(subsystem), b"")?;
        Ok(())
    }

    pub fn is_dirty(&self, subsystem: &str) -> bool {
        self.marker(subsystem).exists()
    }

    /// Remove the marker. A marker that is already gone is not an error.
    pub fn clear(&self, subsystem: &str) -> Result<()> {
        match fs::remove_file(self.marker(subsystem)) {
            Ok(()) => {
                debug!(subsystem, "Dirty marker cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

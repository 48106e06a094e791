//! Common test utilities for aliastool integration tests
//!
//! This module provides shared test infrastructure including:
//! - A scratch appliance layout (config document, lock, run dir, backups)
//! - A settings file pointing the binary at that layout
//! - CLI invocation helpers

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Config document with a mix of eligible and ineligible aliases
pub const CONFIG_XML: &str = r#"<?xml version="1.0"?>
<pfsense>
	<version>21.7</version>
	<revision>
		<time>1600000000</time>
		<description><![CDATA[Initial setup]]></description>
		<username>admin@10.0.0.5</username>
	</revision>
	<aliases>
		<alias>
			<name>webserver</name>
			<type>host</type>
			<address>10.0.0.1</address>
			<descr><![CDATA[Public web server]]></descr>
			<detail><![CDATA[Entry added]]></detail>
		</alias>
		<alias>
			<name>lan_nets</name>
			<type>network</type>
			<address>10.0.0.0/24</address>
		</alias>
		<alias>
			<name>bogons</name>
			<type>host</type>
			<address>192.0.2.1</address>
		</alias>
		<alias>
			<name>blocked</name>
			<type>host</type>
			<address>198.51.100.7</address>
		</alias>
	</aliases>
	<filter>
		<rule>
			<type>pass</type>
			<destination><address>webserver</address></destination>
		</rule>
	</filter>
</pfsense>
"#;

/// Result of running the CLI
#[derive(Debug)]
pub struct CliResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// A scratch appliance layout in a temp directory
pub struct Appliance {
    pub dir: TempDir,
    reload_command: Vec<String>,
}

impl Default for Appliance {
    fn default() -> Self {
        Self::new()
    }
}

impl Appliance {
    /// Layout whose reload command succeeds and leaves a `reloaded` file
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let reloaded = dir.path().join("reloaded");
        let appliance = Self {
            reload_command: vec![
                "sh".to_string(),
                "-c".to_string(),
                format!("touch \"{}\"", reloaded.display()),
            ],
            dir,
        };
        appliance.write_config(CONFIG_XML);
        appliance.write_settings();
        fs::create_dir_all(appliance.run_dir()).expect("Failed to create run dir");
        fs::write(appliance.run_dir().join("aliases.dirty"), b"").expect("Failed to mark dirty");
        appliance
    }

    /// Layout whose reload command exits with `code`
    pub fn with_reload_status(code: i32) -> Self {
        let mut appliance = Self::new();
        appliance.reload_command = vec!["sh".to_string(), "-c".to_string(), format!("exit {}", code)];
        appliance.write_settings();
        appliance
    }

    /// Layout whose reload command runs `script` with the layout dir as `$1`
    pub fn with_reload_script(script: &str) -> Self {
        let mut appliance = Self::new();
        appliance.reload_command = vec![
            "sh".to_string(),
            "-c".to_string(),
            script.to_string(),
            "sh".to_string(),
            appliance.dir.path().display().to_string(),
        ];
        appliance.write_settings();
        appliance
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("conf").join("config.xml")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.path().join("aliastool.toml")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir.path().join("config.lock")
    }

    pub fn run_dir(&self) -> PathBuf {
        self.dir.path().join("run")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.dir.path().join("conf").join("backup")
    }

    pub fn config(&self) -> String {
        fs::read_to_string(self.config_path()).expect("Failed to read config")
    }

    pub fn write_config(&self, content: &str) {
        let path = self.config_path();
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create conf dir");
        fs::write(path, content).expect("Failed to write config");
    }

    pub fn was_reloaded(&self) -> bool {
        self.dir.path().join("reloaded").exists()
    }

    pub fn is_dirty(&self) -> bool {
        self.run_dir().join("aliases.dirty").exists()
    }

    fn write_settings(&self) {
        let literal = |p: &Path| format!("'{}'", p.display());
        let reload = self
            .reload_command
            .iter()
            .map(|a| format!("'{}'", a))
            .collect::<Vec<_>>()
            .join(", ");
        let content = format!(
            "config_xml = {}\nlock_file = {}\ndirty_dir = {}\nbackup_dir = {}\nbackup_count = 2\nreload_command = [{}]\nreserved_names = ['blocked']\n",
            literal(&self.config_path()),
            literal(&self.lock_path()),
            literal(&self.run_dir()),
            literal(&self.backup_dir()),
            reload,
        );
        fs::write(self.settings_path(), content).expect("Failed to write settings");
    }

    /// A command for the binary pointed at this layout
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_aliastool"));
        cmd.env("ALIASTOOL_SETTINGS", self.settings_path());
        cmd.env_remove("ALIASTOOL_CONFIG_XML");
        cmd.env_remove("ALIASTOOL_LOG");
        cmd
    }

    /// Run the CLI with the given arguments (excluding the program name)
    pub fn run(&self, args: &[&str]) -> CliResponse {
        let mut cmd = self.command();
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        let output = cmd.output().expect("Failed to execute command");
        parse_output(output)
    }
}

fn parse_output(output: Output) -> CliResponse {
    CliResponse {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(1),
    }
}

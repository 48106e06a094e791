//! Command dispatcher: validate, then read or update one host alias
//!
//! Validation runs in a fixed order and the first failure wins:
//! 1. the action must be `get` or `set`
//! 2. the alias must exist, not be reserved, and be of type `host`
//! 3. for `set`, the value must be an IP address or a domain name
//!
//! Nothing is written until all three checks pass.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::alias::{is_valid_target, AliasTable, HOST_TYPE};
use crate::errors::{AliasToolError, Result};
use crate::reload::{DirtyMarkers, RuleReloader, ALIASES_SUBSYSTEM};
use crate::store::{ConfigStore, LockMode, WRITE_DESCRIPTION};

/// Token printed after a successful update
pub const OK: &str = "OK";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Get,
    Set,
}

impl Action {
    /// Lock needed on the config store to run this action
    pub fn lock_mode(self) -> LockMode {
        match self {
            Action::Get => LockMode::Shared,
            Action::Set => LockMode::Exclusive,
        }
    }
}

impl FromStr for Action {
    type Err = AliasToolError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "get" => Ok(Action::Get),
            "set" => Ok(Action::Set),
            other => Err(AliasToolError::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Get => write!(f, "get"),
            Action::Set => write!(f, "set"),
        }
    }
}

/// One parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub action: Action,
    pub alias: String,
    /// New address, only meaningful for `set`
    pub value: Option<String>,
}

impl Command {
    /// Parse the raw action. Alias and value are checked against the store
    /// later, in [`AliasTools::run`].
    pub fn parse(action: &str, alias: &str, value: Option<&str>) -> Result<Self> {
        Ok(Self {
            action: action.parse()?,
            alias: alias.to_string(),
            value: value.map(str::to_string),
        })
    }
}

/// Outcome of the reload that follows an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadReport {
    Applied,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Current address of the alias (`get`)
    Address(String),
    /// The alias was updated and stored (`set`)
    Updated { reload: ReloadReport },
}

impl Response {
    /// Reload failure message, if the update was stored but not applied
    pub fn reload_failure(&self) -> Option<&str> {
        match self {
            Response::Updated {
                reload: ReloadReport::Failed(reason),
            } => Some(reason.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Address(address) => write!(f, "{}", address),
            Response::Updated { .. } => write!(f, "{}", OK),
        }
    }
}

/// Annotation stored in the alias `detail` field on update
pub fn entry_note(now: DateTime<Local>) -> String {
    format!("Entry set {}", now.to_rfc2822())
}

/// Dispatcher over a config store and a rule reloader
pub struct AliasTools<'a, S: ?Sized, R: ?Sized> {
    store: &'a mut S,
    reloader: &'a mut R,
    markers: &'a DirtyMarkers,
}

impl<'a, S, R> AliasTools<'a, S, R>
where
    S: ConfigStore + ?Sized,
    R: RuleReloader + ?Sized,
{
    pub fn new(store: &'a mut S, reloader: &'a mut R, markers: &'a DirtyMarkers) -> Self {
        Self {
            store,
            reloader,
            markers,
        }
    }

    /// Parse and run one command
    pub fn execute(&mut self, action: &str, alias: &str, value: Option<&str>) -> Result<Response> {
        let command = Command::parse(action, alias, value)?;
        self.run(&command)
    }

    pub fn run(&mut self, command: &Command) -> Result<Response> {
        debug!(action = %command.action, alias = %command.alias, "Dispatching alias command");
        let mut table = self.eligible_table(&command.alias)?;

        match command.action {
            Action::Get => table
                .find(&command.alias)
                .map(|a| Response::Address(a.address.clone()))
                .ok_or_else(|| AliasToolError::AliasNotFound(command.alias.clone())),
            Action::Set => {
                let value = command.value.as_deref().unwrap_or_default();
                if !is_valid_target(value) {
                    return Err(AliasToolError::InvalidTarget(value.to_string()));
                }
                self.set(&mut table, &command.alias, value)
            }
        }
    }

    /// Load the alias table if `name` is an existing, unreserved host alias
    fn eligible_table(&self, name: &str) -> Result<AliasTable> {
        let not_found = || AliasToolError::AliasNotFound(name.to_string());

        let table = self.store.read_aliases()?.ok_or_else(not_found)?;
        let alias_type = table.classify(name).ok_or_else(not_found)?;

        if self.store.reserved_names().iter().any(|r| r == name) {
            debug!(alias = name, "Alias is reserved");
            return Err(not_found());
        }
        if alias_type != HOST_TYPE {
            debug!(alias = name, alias_type, "Alias is not a host alias");
            return Err(not_found());
        }
        Ok(table)
    }

    fn set(&mut self, table: &mut AliasTable, name: &str, value: &str) -> Result<Response> {
        let alias = table
            .find_mut(name)
            .ok_or_else(|| AliasToolError::AliasNotFound(name.to_string()))?;
        alias.address = value.to_string();
        alias.detail = entry_note(Local::now());

        self.store.write_aliases(table, WRITE_DESCRIPTION)?;
        info!(alias = name, address = value, "Alias address updated");

        let reload = match self.reloader.reload() {
            Ok(0) => {
                if let Err(e) = self.markers.clear(ALIASES_SUBSYSTEM) {
                    warn!(error = %e, "Failed to clear aliases dirty marker");
                }
                ReloadReport::Applied
            }
            Ok(code) => {
                warn!(code, "Filter reload returned non-zero status");
                ReloadReport::Failed(format!("filter reload exited with status {}", code))
            }
            Err(e) => {
                warn!(error = %e, "Filter reload could not be run");
                ReloadReport::Failed(e.to_string())
            }
        };

        Ok(Response::Updated { reload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::Alias;
    use crate::store::MemoryStore;

    struct FakeReloader {
        status: Option<i32>,
        calls: usize,
    }

    impl FakeReloader {
        fn returning(status: i32) -> Self {
            Self { status: Some(status), calls: 0 }
        }

        fn broken() -> Self {
            Self { status: None, calls: 0 }
        }
    }

    impl RuleReloader for FakeReloader {
        fn reload(&mut self) -> Result<i32> {
            self.calls += 1;
            self.status
                .ok_or_else(|| AliasToolError::Reload("no such command".into()))
        }
    }

    struct Fixture {
        store: MemoryStore,
        reloader: FakeReloader,
        markers: DirtyMarkers,
        _dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_reloader(FakeReloader::returning(0))
        }

        fn with_reloader(reloader: FakeReloader) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let markers = DirtyMarkers::new(dir.path());
            markers.mark(ALIASES_SUBSYSTEM).unwrap();
            let store = MemoryStore::new(vec![
                Alias::new("webserver", "host", "10.0.0.1"),
                Alias::new("lan_nets", "network", "10.0.0.0/24"),
                Alias::new("bogons", "host", "10.9.9.9"),
                Alias::new("mailhost", "host", "mail.example.com"),
            ])
            .with_reserved(&["mailhost"]);
            Self {
                store,
                reloader,
                markers,
                _dir: dir,
            }
        }

        fn execute(&mut self, action: &str, alias: &str, value: Option<&str>) -> Result<Response> {
            AliasTools::new(&mut self.store, &mut self.reloader, &self.markers).execute(action, alias, value)
        }
    }

    #[test]
    fn test_set_then_get() {
        let mut fx = Fixture::new();

        let response = fx.execute("set", "webserver", Some("192.168.1.10")).unwrap();
        assert_eq!(response.to_string(), "OK");
        assert_eq!(response.reload_failure(), None);

        let response = fx.execute("get", "webserver", None).unwrap();
        assert_eq!(response, Response::Address("192.168.1.10".into()));
    }

    #[test]
    fn test_set_records_note_and_reloads() {
        let mut fx = Fixture::new();

        fx.execute("set", "webserver", Some("www.example.org")).unwrap();

        let alias = fx.store.aliases().unwrap().find("webserver").unwrap().clone();
        assert!(alias.detail.starts_with("Entry set "));
        assert_eq!(fx.store.revisions(), [WRITE_DESCRIPTION.to_string()]);
        assert_eq!(fx.reloader.calls, 1);
        assert!(!fx.markers.is_dirty(ALIASES_SUBSYSTEM));
    }

    #[test]
    fn test_get_does_not_write_or_reload() {
        let mut fx = Fixture::new();

        let response = fx.execute("get", "webserver", None).unwrap();

        assert_eq!(response.to_string(), "10.0.0.1");
        assert!(fx.store.revisions().is_empty());
        assert_eq!(fx.reloader.calls, 0);
        assert!(fx.markers.is_dirty(ALIASES_SUBSYSTEM));
    }

    #[test]
    fn test_invalid_action_wins_over_everything() {
        let mut fx = Fixture::new();

        for action in ["delete", "GET", "", "sets"] {
            let err = fx.execute(action, "doesnotexist", Some("!")).unwrap_err();
            assert!(matches!(err, AliasToolError::InvalidAction(_)), "{action}");
        }
        assert!(fx.store.revisions().is_empty());
    }

    #[test]
    fn test_alias_not_found_cases() {
        let mut fx = Fixture::new();

        for alias in ["doesnotexist", "lan_nets", "bogons", "mailhost", "WEBSERVER"] {
            for action in ["get", "set"] {
                let err = fx.execute(action, alias, Some("10.1.1.1")).unwrap_err();
                assert_eq!(err.to_string(), "ERROR: Alias not found", "{action} {alias}");
            }
        }
        assert!(fx.store.revisions().is_empty());
        assert_eq!(fx.reloader.calls, 0);
    }

    #[test]
    fn test_missing_alias_section() {
        let dir = tempfile::tempdir().unwrap();
        let markers = DirtyMarkers::new(dir.path());
        let mut store = MemoryStore::empty();
        let mut reloader = FakeReloader::returning(0);

        let err = AliasTools::new(&mut store, &mut reloader, &markers)
            .execute("get", "webserver", None)
            .unwrap_err();
        assert!(matches!(err, AliasToolError::AliasNotFound(_)));
    }

    #[test]
    fn test_alias_check_precedes_target_check() {
        let mut fx = Fixture::new();
        let err = fx.execute("set", "doesnotexist", Some("notanip_or_domain!")).unwrap_err();
        assert!(matches!(err, AliasToolError::AliasNotFound(_)));
    }

    #[test]
    fn test_invalid_target() {
        let mut fx = Fixture::new();

        for value in [Some("notanip_or_domain!"), Some(""), Some("10.0.0.1 10.0.0.2"), None] {
            let err = fx.execute("set", "webserver", value).unwrap_err();
            assert_eq!(err.to_string(), "ERROR: Invalid host/IP");
        }
        assert_eq!(fx.store.aliases().unwrap().find("webserver").unwrap().address, "10.0.0.1");
        assert!(fx.store.revisions().is_empty());
        assert_eq!(fx.reloader.calls, 0);
    }

    #[test]
    fn test_repeated_set_is_idempotent() {
        let mut fx = Fixture::new();

        fx.execute("set", "webserver", Some("10.2.2.2")).unwrap();
        let first = fx.store.aliases().unwrap().clone();
        fx.execute("set", "webserver", Some("10.2.2.2")).unwrap();
        let second = fx.store.aliases().unwrap().clone();

        let addresses = |t: &AliasTable| t.iter().map(|a| a.address.clone()).collect::<Vec<_>>();
        assert_eq!(addresses(&first), addresses(&second));
        assert_eq!(fx.reloader.calls, 2);
    }

    #[test]
    fn test_reload_failure_is_reported_but_change_kept() {
        let mut fx = Fixture::with_reloader(FakeReloader::returning(1));

        let response = fx.execute("set", "webserver", Some("10.3.3.3")).unwrap();

        assert_eq!(response.to_string(), "OK");
        assert_eq!(response.reload_failure(), Some("filter reload exited with status 1"));
        assert_eq!(fx.store.aliases().unwrap().find("webserver").unwrap().address, "10.3.3.3");
        assert!(fx.markers.is_dirty(ALIASES_SUBSYSTEM));
    }

    #[test]
    fn test_reload_spawn_failure_is_reported() {
        let mut fx = Fixture::with_reloader(FakeReloader::broken());

        let response = fx.execute("set", "webserver", Some("10.3.3.3")).unwrap();

        assert!(response.reload_failure().unwrap().contains("no such command"));
        assert!(fx.markers.is_dirty(ALIASES_SUBSYSTEM));
    }

    #[test]
    fn test_action_lock_modes() {
        assert_eq!(Action::Get.lock_mode(), LockMode::Shared);
        assert_eq!(Action::Set.lock_mode(), LockMode::Exclusive);
        assert_eq!("set".parse::<Action>().unwrap(), Action::Set);
    }

    #[test]
    fn test_entry_note_format() {
        let now = DateTime::parse_from_rfc2822("Tue, 1 Jul 2003 10:52:37 +0200")
            .unwrap()
            .with_timezone(&Local);
        let note = entry_note(now);
        assert!(note.starts_with("Entry set "));
        assert!(DateTime::parse_from_rfc2822(note.trim_start_matches("Entry set ")).is_ok());
    }
}

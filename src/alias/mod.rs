//! Firewall alias records and the alias table
//!
//! Aliases are owned by the appliance configuration. This crate only reads
//! them and rewrites the `address`/`detail` fields of host aliases.

pub mod validate;

pub use validate::{is_domain, is_ipaddr, is_valid_target};

/// Type tag of aliases this tool may read or update
pub const HOST_TYPE: &str = "host";

/// Alias names reserved for internal tables
pub const RESERVED_TABLE_NAMES: &[&str] = &[
    "bogons",
    "bogonsv6",
    "negate_networks",
    "snort2c",
    "sshguard",
    "tonatsubnets",
    "virusprot",
    "vpn_networks",
];

/// A single alias record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alias {
    pub name: String,
    pub alias_type: String,
    /// IP, hostname, or a space separated list of them
    pub address: String,
    /// Per-address annotations
    pub detail: String,
    pub descr: String,
}

impl Alias {
    pub fn new(name: impl Into<String>, alias_type: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias_type: alias_type.into(),
            address: address.into(),
            ..Self::default()
        }
    }
}

/// The alias collection, kept in store order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: Vec<Alias>,
}

impl AliasTable {
    pub fn new(aliases: Vec<Alias>) -> Self {
        Self { aliases }
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alias> {
        self.aliases.iter()
    }

    pub fn as_slice(&self) -> &[Alias] {
        &self.aliases
    }

    /// First alias whose name matches exactly
    pub fn find(&self, name: &str) -> Option<&Alias> {
        self.aliases.iter().find(|a| a.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Alias> {
        self.aliases.iter_mut().find(|a| a.name == name)
    }

    /// Type tag of the named alias, or `None` when the name is not an alias
    pub fn classify(&self, name: &str) -> Option<&str> {
        self.find(name).map(|a| a.alias_type.as_str())
    }
}

impl From<Vec<Alias>> for AliasTable {
    fn from(aliases: Vec<Alias>) -> Self {
        Self::new(aliases)
    }
}

/// Built-in reserved table names followed by `extra`, without duplicates
pub fn reserved_names(extra: &[String]) -> Vec<String> {
    let mut names: Vec<String> = RESERVED_TABLE_NAMES.iter().map(|n| n.to_string()).collect();
    for name in extra {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AliasTable {
        AliasTable::new(vec![
            Alias::new("webserver", "host", "10.0.0.1"),
            Alias::new("lan_nets", "network", "10.0.0.0/24"),
            Alias::new("webserver", "host", "10.0.0.2"),
        ])
    }

    #[test]
    fn test_find_first_match_wins() {
        let t = table();
        assert_eq!(t.find("webserver").map(|a| a.address.as_str()), Some("10.0.0.1"));
        assert!(t.find("WebServer").is_none());
    }

    #[test]
    fn test_classify() {
        let t = table();
        assert_eq!(t.classify("webserver"), Some("host"));
        assert_eq!(t.classify("lan_nets"), Some("network"));
        assert_eq!(t.classify("missing"), None);
    }

    #[test]
    fn test_find_mut_updates_in_place() {
        let mut t = table();
        t.find_mut("webserver").unwrap().address = "192.168.1.10".into();
        assert_eq!(t.as_slice()[0].address, "192.168.1.10");
        assert_eq!(t.as_slice()[2].address, "10.0.0.2");
    }

    #[test]
    fn test_reserved_names() {
        let names = reserved_names(&[]);
        assert!(names.iter().any(|n| n == "bogons"));
        assert!(!names.iter().any(|n| n == "webserver"));

        let names = reserved_names(&["webserver".to_string(), "bogons".to_string()]);
        assert!(names.iter().any(|n| n == "webserver"));
        assert_eq!(names.len(), RESERVED_TABLE_NAMES.len() + 1);
    }
}

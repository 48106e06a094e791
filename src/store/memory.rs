//! In-memory configuration store

use crate::alias::{reserved_names, Alias, AliasTable};
use crate::errors::Result;

use super::ConfigStore;

/// A store held entirely in memory
///
/// Each write replaces the table and appends its description to
/// [`MemoryStore::revisions`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    aliases: Option<AliasTable>,
    reserved: Vec<String>,
    revisions: Vec<String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            aliases: None,
            reserved: reserved_names(&[]),
            revisions: Vec::new(),
        }
    }
}

impl MemoryStore {
    /// Store with an alias section holding `aliases`
    pub fn new(aliases: Vec<Alias>) -> Self {
        Self {
            aliases: Some(AliasTable::new(aliases)),
            ..Self::default()
        }
    }

    /// Store without an alias section
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reserve `names` in addition to the built-in reserved tables
    pub fn with_reserved(mut self, names: &[&str]) -> Self {
        let extra: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        self.reserved = reserved_names(&extra);
        self
    }

    pub fn aliases(&self) -> Option<&AliasTable> {
        self.aliases.as_ref()
    }

    /// Descriptions of every write, oldest first
    pub fn revisions(&self) -> &[String] {
        &self.revisions
    }
}

impl ConfigStore for MemoryStore {
    fn read_aliases(&self) -> Result<Option<AliasTable>> {
        Ok(self.aliases.clone())
    }

    fn reserved_names(&self) -> &[String] {
        &self.reserved
    }

    fn write_aliases(&mut self, table: &AliasTable, description: &str) -> Result<()> {
        self.aliases = Some(table.clone());
        self.revisions.push(description.to_string());
        Ok(())
    }
}

//! Configuration store access
//!
//! - [`ConfigStore`] - read/write contract used by the dispatcher
//! - [`XmlConfigStore`] - the appliance XML configuration document
//! - [`MemoryStore`] - in-process store
//! - [`ConfigLock`] - advisory lock around a read-modify-write cycle
//! - [`backup`] - rotating copies of the document taken before each write

pub mod backup;
pub mod lock;
pub mod memory;
pub mod xml;

pub use lock::{ConfigLock, LockMode};
pub use memory::MemoryStore;
pub use xml::XmlConfigStore;

use crate::alias::AliasTable;
use crate::errors::Result;

/// Change description recorded when an alias entry is updated
pub const WRITE_DESCRIPTION: &str = "Edited a firewall alias by aliastools.";

/// Read/write access to the alias collection of a configuration store
pub trait ConfigStore {
    /// Load the alias collection. `None` when the store has no alias section.
    fn read_aliases(&self) -> Result<Option<AliasTable>>;

    /// Alias names excluded from user-level mutation
    fn reserved_names(&self) -> &[String];

    /// Persist the whole store with `table` as its alias collection
    fn write_aliases(&mut self, table: &AliasTable, description: &str) -> Result<()>;
}

//! aliastool library interface
//!
//! Reads or updates the address of a firewall host alias stored in the
//! appliance configuration document, then reloads the firewall rules.
//!
//! # Module Organization
//!
//! - [`dispatch`] - Command validation and execution (AliasTools)
//! - [`alias`] - Alias records, the alias table, address validation
//! - [`store`] - Config store trait, XML document store, backups, locking
//! - [`reload`] - Rule reload trigger and dirty markers
//! - [`errors`] - Error types (AliasToolError, Result)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - Main execution logic

pub mod alias;
pub mod cli;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod errors;
pub mod logging;
pub mod reload;
pub mod status;
pub mod store;

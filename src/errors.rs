//! Error types for aliastool

use thiserror::Error;

/// Main error type for aliastool
///
/// The first three variants are command rejections. Their `Display` output is
/// the exact line printed to the operator, so it must not change.
#[derive(Error, Debug)]
pub enum AliasToolError {
    #[error("ERROR: Invalid action")]
    InvalidAction(String),

    #[error("ERROR: Alias not found")]
    AliasNotFound(String),

    #[error("ERROR: Invalid host/IP")]
    InvalidTarget(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML decode error: {0}")]
    XmlDecode(#[from] quick_xml::DeError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Invalid settings TOML: {0}")]
    SettingsToml(#[from] toml::de::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Reload error: {0}")]
    Reload(String),
}

impl AliasToolError {
    /// True for the three command rejections (bad action, alias, or target)
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AliasToolError::InvalidAction(_)
                | AliasToolError::AliasNotFound(_)
                | AliasToolError::InvalidTarget(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AliasToolError>;

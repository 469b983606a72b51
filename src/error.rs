use std::fmt;

/// Boxed error used at IO boundaries (database, config files, server)
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the estimator, the form and the store contract
#[derive(Debug, Clone, PartialEq)]
pub enum LogError {
    /// Metabolism time requested for a body weight of zero
    DivisionUndefined,
    /// A form field is outside what the form accepts
    InvalidInput(String),
    /// The store could not be opened or read; submissions are refused
    StoreUnavailable(String),
    /// A read or write against an open store failed
    Store(String),
    /// A stored row could not be turned into an entry
    MalformedRow { index: usize, reason: String },
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::DivisionUndefined => {
                write!(f, "Metabolism time is undefined for a body weight of 0 kg")
            }
            LogError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            LogError::StoreUnavailable(msg) => {
                write!(f, "Store unavailable, entry was not saved: {}", msg)
            }
            LogError::Store(msg) => write!(f, "Store error: {}", msg),
            LogError::MalformedRow { index, reason } => {
                write!(f, "Malformed row {}: {}", index, reason)
            }
        }
    }
}

impl std::error::Error for LogError {}

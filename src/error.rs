use std::fmt;

/// Central error types for the timesheet sync core
#[derive(Debug)]
pub enum TimesheetError {
    /// Invalid input (year, month, hours, status, day key); never retried
    Validation(String),
    /// Network-level failure, request never reached the server
    Transport(String),
    /// Well-formed request answered with a non-success response
    Server { status: u16, message: String },
    /// Stored document content failed to parse
    CorruptDocument(String),
    /// Filesystem error while reading or writing a document
    Storage(std::io::Error),
    /// General error
    Other(String),
}

impl fmt::Display for TimesheetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimesheetError::Validation(msg) => write!(f, "Validation error: {}", msg),
            TimesheetError::Transport(msg) => write!(f, "Transport error: {}", msg),
            TimesheetError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            TimesheetError::CorruptDocument(msg) => write!(f, "Corrupt document: {}", msg),
            TimesheetError::Storage(e) => write!(f, "Storage error: {}", e),
            TimesheetError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TimesheetError {}

impl From<std::io::Error> for TimesheetError {
    fn from(e: std::io::Error) -> Self {
        TimesheetError::Storage(e)
    }
}

impl TimesheetError {
    /// Whether the autosave loop may retry the failed operation.
    ///
    /// Only transient failures qualify; validation errors are final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TimesheetError::Transport(_) | TimesheetError::Server { .. }
        )
    }

    /// HTTP status the API boundary reports for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            TimesheetError::Validation(_) => 400,
            TimesheetError::Server { status, .. } => *status,
            _ => 500,
        }
    }
}

//! Batch task error types.

/// A batch item's task failed outside the executor (panicked or aborted).
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Batch Error: item {} {} at line {} in {}", index, message, line, file)]
pub struct BatchError {
    /// Position of the failed item
    pub index: usize,
    /// What happened to the task
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl BatchError {
    /// Create a new BatchError at the current location.
    #[track_caller]
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            index,
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}

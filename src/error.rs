/// Failures raised by the best-fit selector and the classifier.
///
/// These are pure computations, so every variant describes a problem with
/// the input tables. Nothing here is transient or worth retrying.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    /// A table is malformed or the tables do not fit together.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A table has no rows or no value columns where at least one is required.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A test `x` value has no row in the ideal table.
    #[error("series '{series}': x={x} has no row in ideal column '{column}'")]
    Lookup { series: String, column: String, x: f64 },
}

impl FitError {
    pub fn invalid(message: impl Into<String>) -> Self {
        FitError::InvalidInput(message.into())
    }

    pub fn empty(message: impl Into<String>) -> Self {
        FitError::EmptyInput(message.into())
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let exit_code = match err {
            FitError::InvalidInput(_) => 2,
            FitError::EmptyInput(_) => 3,
            FitError::Lookup { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

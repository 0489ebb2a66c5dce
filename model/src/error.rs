use std::fmt;
use std::path::PathBuf;

/// The error hierarchy shared across the workspace. Fatal variants map to
/// the process exit codes documented for the simulator binary; soft
/// conditions (timeouts, exceeded search bounds) are logged at the call
/// site instead of being constructed as errors at all.
#[derive(Debug)]
pub enum SimError {
    /// Input file missing or malformed. Exit code 1.
    InputFile { path: PathBuf, reason: String },
    /// A previously committed trip could not be reproved feasible, or a
    /// committed request is missing from the RTV graph. Exit code 2.
    InvariantViolation(String),
    /// The network/config could not be constructed into something the
    /// solver can run on (e.g. zero nodes). Exit code 3.
    Configuration(String),
}

impl SimError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SimError::InputFile { .. } => 1,
            SimError::InvariantViolation(_) => 2,
            SimError::Configuration(_) => 3,
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::InputFile { path, reason } => {
                write!(f, "failed to read {}: {}", path.display(), reason)
            }
            SimError::InvariantViolation(msg) => write!(f, "invariant violation: {}", msg),
            SimError::Configuration(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}

pub type SimResult<T> = Result<T, SimError>;

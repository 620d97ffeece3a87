use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use rand_distr::NormalError;
use safetensors::SafeTensorError;

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidDataset(String),
    InvalidDistribution(String),
    InvalidModel(String),
    ParamGenExhausted {
        got: usize,
        expected: usize,
    },
    Io(io::Error),
    Json(serde_json::Error),
    SafeTensors(SafeTensorError),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch in {what}, got {got} and expected {expected}"
            ),
            MlErr::InvalidDataset(msg) => write!(f, "invalid dataset: {msg}"),
            MlErr::InvalidDistribution(msg) => write!(f, "invalid distribution: {msg}"),
            MlErr::InvalidModel(msg) => write!(f, "invalid model: {msg}"),
            MlErr::ParamGenExhausted { got, expected } => write!(
                f,
                "The parameter generator got exhausted after {got} of the expected {expected} parameters"
            ),
            MlErr::Io(e) => write!(f, "io error: {e}"),
            MlErr::Json(e) => write!(f, "json error: {e}"),
            MlErr::SafeTensors(e) => write!(f, "safetensors error: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Io(e) => Some(e),
            MlErr::Json(e) => Some(e),
            MlErr::SafeTensors(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<SafeTensorError> for MlErr {
    fn from(value: SafeTensorError) -> Self {
        Self::SafeTensors(value)
    }
}

impl From<NormalError> for MlErr {
    fn from(value: NormalError) -> Self {
        Self::InvalidDistribution(value.to_string())
    }
}

use crate::cloud::CloudError;
use thiserror::Error;

/// Fatal resolution failures.
///
/// Unresolvable references are not errors: they resolve to `UNKNOWN ...`
/// sentinel strings and the walk continues.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No default region configured, set AWS_REGION or pass a region explicitly")]
    MissingDefaultRegion,

    #[error("\"{function}\" {message}")]
    Arity {
        function: &'static str,
        message: String,
    },

    #[error("\"{0}\" expects a string")]
    NotString(&'static str),

    #[error("\"{0}\" expects an array")]
    NotArray(&'static str),

    #[error("\"{0}\" expects an object")]
    NotObject(&'static str),

    #[error("\"{function}\" index {index} is out of bounds for {len} values")]
    OutOfBounds {
        function: &'static str,
        index: i64,
        len: usize,
    },

    #[error("\"{0}\" index must be an integer")]
    InvalidIndex(&'static str),

    #[error("\"{0}\" delimiter must not be empty")]
    EmptyDelimiter(&'static str),

    #[error("Malformed condition: {0}")]
    MalformedCondition(String),

    #[error("Unknown condition: {0}")]
    UnknownCondition(String),

    #[error("Condition refers to itself: {0}")]
    CyclicCondition(String),

    #[error("Template has no {0} section")]
    MissingSection(&'static str),

    #[error("Key not found: {0}")]
    MissingKey(String),

    #[error("Template nesting exceeds {0} levels")]
    DepthLimitExceeded(usize),

    #[error("Resolved template contains itself")]
    Cycle,

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

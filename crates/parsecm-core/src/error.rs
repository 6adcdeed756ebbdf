use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseCmError {
    #[error("malformed backstop line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("maneuver summary has too many attitudes in section ({found} found)")]
    TooManyAttitudeBlocks { found: usize },

    #[error("maneuver summary section needs initial and final attitudes ({found} found)")]
    MissingAttitudeBlock { found: usize },

    #[error("maneuver summary section has no OUTPUT DATA block")]
    MissingOutputBlock,

    #[error("missing required field '{field}' in {block} block")]
    MissingRequiredField { block: String, field: String },

    #[error("invalid quaternion component '{value}' in {block} block")]
    InvalidQuaternion { block: String, value: String },

    #[error("expected exactly one '{variable}' assignment, found {count}")]
    AlignmentAssignmentNotUnique { variable: String, count: usize },

    #[error("'{variable}' assignment needs 12 lines, only {available} available")]
    TruncatedAlignmentTable { variable: String, available: usize },

    #[error("malformed alignment row at line {line}")]
    MalformedAlignmentRow { line: usize },

    #[error("invalid date '{0}': expected YYYY:DDD:hh:mm:ss.sss")]
    InvalidDate(String),

    #[error("seconds value {0} is out of range")]
    InvalidSecs(f64),

    #[error("maneuver {index}: {source}")]
    InManeuver {
        index: usize,
        #[source]
        source: Box<ParseCmError>,
    },

    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<ParseCmError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl ParseCmError {
    /// Attach the file being read. Already-wrapped errors are left alone.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            ParseCmError::InFile { .. } => self,
            other => ParseCmError::InFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, skipping file and maneuver context.
    pub fn root_cause(&self) -> &ParseCmError {
        match self {
            ParseCmError::InFile { source, .. } | ParseCmError::InManeuver { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseCmError>;

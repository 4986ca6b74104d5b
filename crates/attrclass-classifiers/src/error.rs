use thiserror::Error;

/// Coarse classification of a [`ClassifierError`], used by callers that pick a
/// policy per failure kind (skip an instance, abort the run, exit code, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Schema,
    InvalidAttribute,
    AttributeNotSet,
    Training,
    Inference,
    DatasetParse,
    UnknownLabel,
    Io,
}

/// Errors produced while loading data, training, classifying or reporting.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The dataset declares no enumerated-domain attribute.
    #[error("no class attribute: the dataset has no nominal attribute")]
    NoClassAttribute,
    /// The dataset declares more than one enumerated-domain attribute.
    #[error("multiple class attributes: found both '{first}' and '{second}'")]
    MultipleClassAttributes { first: String, second: String },
    /// Two attributes in one header share a name.
    #[error("duplicate attribute name: {0}")]
    DuplicateAttribute(String),
    /// A key outside the schema's value attributes was used.
    #[error("key is not a value attribute of this schema: {0}")]
    InvalidAttribute(String),
    /// A value attribute has not been given a value.
    #[error("attribute not set: {0}")]
    AttributeNotSet(String),
    /// Algorithm/transform resolution, option parsing or fitting failed.
    #[error("training failed: {0}")]
    Training(String),
    /// The predictor or transform failed while classifying one example.
    #[error("inference failed: {0}")]
    Inference(String),
    /// The input file could not be read or is malformed.
    #[error("dataset parse error: {0}")]
    DatasetParse(String),
    /// A label the confusion matrix was not built with.
    #[error("label '{0}' is not tracked by this confusion matrix")]
    UnknownLabel(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ClassifierError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoClassAttribute
            | Self::MultipleClassAttributes { .. }
            | Self::DuplicateAttribute(_) => ErrorKind::Schema,
            Self::InvalidAttribute(_) => ErrorKind::InvalidAttribute,
            Self::AttributeNotSet(_) => ErrorKind::AttributeNotSet,
            Self::Training(_) => ErrorKind::Training,
            Self::Inference(_) => ErrorKind::Inference,
            Self::DatasetParse(_) => ErrorKind::DatasetParse,
            Self::UnknownLabel(_) => ErrorKind::UnknownLabel,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Errors tied to a single example rather than to the whole run.
    pub fn is_per_instance(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AttributeNotSet | ErrorKind::Inference | ErrorKind::UnknownLabel
        )
    }
}

impl From<csv::Error> for ClassifierError {
    fn from(err: csv::Error) -> Self {
        ClassifierError::Io(err.into())
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;

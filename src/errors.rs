use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("<{tag}> tag has no name attribute")]
    MissingName { tag: String },

    #[error("Option {value:?} not found in field {field:?}")]
    UnknownOption { value: String, field: String },

    #[error("Label {value:?} matches {matches} options in field {field:?}")]
    AmbiguousLabel {
        value: String,
        field: String,
        matches: usize,
    },

    #[error("Option {value:?} already selected in field {field:?}")]
    AlreadySelected { value: String, field: String },

    #[error("Option {value:?} is not selected in field {field:?}")]
    NotSelected { value: String, field: String },

    #[error("Invalid value for field {field:?}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Not a form field: {0}")]
    InvalidFieldType(String),

    #[error("Invalid submit: {0}")]
    InvalidSubmit(String),

    #[error("Value must be a file object or file path: {0}")]
    BadFileValue(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Form not found: {0}")]
    FormNotFound(String),

    #[error("DOM parsing failed: {0}")]
    DomParse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, FormError>;

impl FormError {
    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        FormError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

use thiserror::Error;

/// Errors raised while validating or shaping node data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid label {0:?}: expected an identifier of at most 64 characters")]
    InvalidLabel(String),

    #[error("Invalid field name {0:?}: expected an identifier of at most 64 characters")]
    InvalidField(String),

    #[error("Field {0} is assigned at creation and cannot be updated")]
    ImmutableField(String),

    #[error("{label} node has no textual id")]
    MissingId { label: String },
}

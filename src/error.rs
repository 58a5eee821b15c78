pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The named attribute is absent on the node.
    #[error("attribute {name:?} not found on {node}")]
    AttributeNotFound { node: String, name: String },
    /// Stored or requested element kind is outside the supported set.
    #[error("unsupported element kind: {0}")]
    UnsupportedKind(String),
    /// A typed read asked for a different kind than the one stored.
    #[error("element kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: String, found: String },
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },
    #[error("storage write failed: {0}")]
    StorageWrite(String),
    #[error("storage read failed: {0}")]
    StorageRead(String),
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("{0}")]
    General(String),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Wrapped(Box<dyn std::error::Error>),
}

impl Error {
    pub fn general(message: impl Into<String>) -> Self {
        Self::General(message.into())
    }

    pub fn wrap(error: impl std::error::Error + 'static) -> Self {
        Self::Wrapped(Box::new(error))
    }

    pub(crate) fn not_found(node: impl Into<String>, name: impl Into<String>) -> Self {
        Self::AttributeNotFound {
            node: node.into(),
            name: name.into(),
        }
    }

    pub(crate) fn invalid_selection(message: impl Into<String>) -> Self {
        Self::InvalidSelection(message.into())
    }

    /// Whether this error only reports an absent attribute.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AttributeNotFound { .. })
    }
}

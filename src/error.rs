use thiserror::Error;

/// Machine-readable code for failures that carry no classification.
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

#[derive(Error, Debug)]
pub enum BlogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No {model} found for {field} '{value}'")]
    NotFound {
        model: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("A {model} with {field} '{value}' already exists")]
    UniqueViolation {
        model: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Cannot connect {relation}: no {model} with {field} '{value}'")]
    RelationNotFound {
        relation: &'static str,
        model: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Project already initialized at {0}")]
    AlreadyInitialized(String),
}

impl BlogError {
    /// The `extensions.code` reported to GraphQL clients.
    ///
    /// `None` means the failure is unclassified and will surface as
    /// [`INTERNAL_SERVER_ERROR`].
    pub fn code(&self) -> Option<&'static str> {
        match self {
            BlogError::NotFound { .. } => Some("NOT_FOUND"),
            BlogError::UniqueViolation { .. } => Some("CONFLICT"),
            BlogError::RelationNotFound { .. } => Some("RELATION_NOT_FOUND"),
            BlogError::Validation(_) => Some("BAD_USER_INPUT"),
            BlogError::Unauthenticated(_) => Some("UNAUTHENTICATED"),
            BlogError::Config(_)
            | BlogError::Storage(_)
            | BlogError::Io(_)
            | BlogError::Json(_)
            | BlogError::Toml(_)
            | BlogError::AlreadyInitialized(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BlogError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classified_codes() {
        let err = BlogError::NotFound {
            model: "Post",
            field: "id",
            value: "abc".to_string(),
        };
        assert_eq!(err.code(), Some("NOT_FOUND"));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "No Post found for id 'abc'");

        let err = BlogError::RelationNotFound {
            relation: "author",
            model: "User",
            field: "email",
            value: "a@x.com".to_string(),
        };
        assert_eq!(err.code(), Some("RELATION_NOT_FOUND"));
    }

    #[test]
    fn test_io_errors_are_unclassified() {
        let err: BlogError = std::io::Error::other("disk on fire").into();
        assert_eq!(err.code(), None);
        assert!(!err.is_not_found());
    }
}

use thiserror::Error;

/// Result type alias using UnionError
pub type Result<T> = std::result::Result<T, UnionError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration
    Configuration,

    // Lookup
    NotFound,

    // Dispatch
    EmptyUnion,
    NoMatch,
    Rejected,

    // Lifecycle
    Detached,

    // Integration
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::EmptyUnion => "ERR_EMPTY_UNION",
            ExErrorKind::NoMatch => "ERR_NO_MATCH",
            ExErrorKind::Rejected => "ERR_REJECTED",
            ExErrorKind::Detached => "ERR_DETACHED",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and the namespace
/// and variant context needed to diagnose a failed dispatch.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    namespace: Option<String>,
    variant: Option<String>,
    message: String,
    rejected: Option<Vec<String>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            namespace: None,
            variant: None,
            message: String::new(),
            rejected: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add namespace context
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add variant context
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add the variants that rejected an input (populated on NoMatch)
    pub fn with_rejected(mut self, variants: Vec<String>) -> Self {
        self.rejected = Some(variants);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the namespace context, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Get the variant context, if any
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the rejecting variants, if any
    pub fn rejected(&self) -> Option<&[String]> {
        self.rejected.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(namespace) = &self.namespace {
            write!(f, " (namespace: {})", namespace)?;
        }
        if let Some(variant) = &self.variant {
            write!(f, " (variant: {})", variant)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// A single variant's refusal of an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub variant: String,
    pub reason: String,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.variant, self.reason)
    }
}

/// Error taxonomy for union operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnionError {
    // ===== Configuration Errors =====
    /// Configuration refers to something the namespace cannot satisfy
    #[error("Invalid union configuration for [{namespace}]: {reason}")]
    InvalidConfiguration { namespace: String, reason: String },

    /// Namespace already has a union bound to it
    #[error("[{namespace}] is already bound to a union")]
    AlreadyBound { namespace: String },

    // ===== Lookup Errors =====
    /// Name is not currently declared in the namespace
    #[error("Constant [{name}] not defined in [{namespace}]")]
    NotFound { name: String, namespace: String },

    // ===== Dispatch Errors =====
    /// No constructible variant is currently available
    #[error("No constructors found in [{namespace}]")]
    EmptyUnion { namespace: String },

    /// Every variant rejected the input
    #[error("No variant of [{union}] accepts the given input")]
    NoMatch {
        union: String,
        rejections: Vec<Rejection>,
    },

    /// A single variant refused the input
    #[error("[{variant}] rejected input: {reason}")]
    Rejected { variant: String, reason: String },

    // ===== Lifecycle Errors =====
    /// The namespace owning a union has been dropped
    #[error("Namespace [{namespace}] was dropped while its union is still in use")]
    Detached { namespace: String },

    // ===== Generic Errors =====
    /// Serialization error (configuration documents)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl UnionError {
    /// Shorthand for a variant-level rejection
    pub fn rejected(variant: impl Into<String>, reason: impl Into<String>) -> Self {
        UnionError::Rejected {
            variant: variant.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that mean "this input does not fit", as opposed to a
    /// union that cannot currently be evaluated
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            UnionError::Rejected { .. } | UnionError::NoMatch { .. } | UnionError::EmptyUnion { .. }
        )
    }

    /// Canonical kind of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            UnionError::InvalidConfiguration { .. } | UnionError::AlreadyBound { .. } => {
                ExErrorKind::Configuration
            }
            UnionError::NotFound { .. } => ExErrorKind::NotFound,
            UnionError::EmptyUnion { .. } => ExErrorKind::EmptyUnion,
            UnionError::NoMatch { .. } => ExErrorKind::NoMatch,
            UnionError::Rejected { .. } => ExErrorKind::Rejected,
            UnionError::Detached { .. } => ExErrorKind::Detached,
            UnionError::Serialization { .. } => ExErrorKind::Serialization,
            UnionError::Internal { .. } => ExErrorKind::Internal,
        }
    }
}

/// Conversion from UnionError to ExError
impl From<UnionError> for ExError {
    fn from(err: UnionError) -> Self {
        let kind = err.kind();
        match err {
            UnionError::InvalidConfiguration { namespace, reason } => ExError::new(kind)
                .with_op("configure")
                .with_namespace(namespace)
                .with_message(reason),

            UnionError::AlreadyBound { namespace } => ExError::new(kind)
                .with_op("bind_union")
                .with_namespace(namespace)
                .with_message("Namespace is already bound to a union"),

            UnionError::NotFound { name, namespace } => ExError::new(kind)
                .with_namespace(namespace)
                .with_variant(name)
                .with_message("Name is not declared in namespace"),

            UnionError::EmptyUnion { namespace } => ExError::new(kind)
                .with_op("try_construct")
                .with_namespace(namespace)
                .with_message("No constructible variants"),

            UnionError::NoMatch { union, rejections } => ExError::new(kind)
                .with_op("try_construct")
                .with_namespace(union)
                .with_rejected(rejections.into_iter().map(|r| r.variant).collect())
                .with_message("Every variant rejected the input"),

            UnionError::Rejected { variant, reason } => ExError::new(kind)
                .with_op("try_construct")
                .with_variant(variant)
                .with_message(reason),

            UnionError::Detached { namespace } => ExError::new(kind)
                .with_namespace(namespace)
                .with_message("Namespace was dropped"),

            UnionError::Serialization { message } => ExError::new(kind).with_message(message),

            UnionError::Internal { message } => ExError::new(kind).with_message(message),
        }
    }
}

/// Conversion from serde_json::Error to UnionError
impl From<serde_json::Error> for UnionError {
    fn from(err: serde_json::Error) -> Self {
        UnionError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from toml::de::Error to UnionError
impl From<toml::de::Error> for UnionError {
    fn from(err: toml::de::Error) -> Self {
        UnionError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::Configuration, "ERR_CONFIGURATION"),
            (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
            (ExErrorKind::EmptyUnion, "ERR_EMPTY_UNION"),
            (ExErrorKind::NoMatch, "ERR_NO_MATCH"),
            (ExErrorKind::Rejected, "ERR_REJECTED"),
            (ExErrorKind::Detached, "ERR_DETACHED"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_already_bound_is_a_configuration_error() {
        let err = UnionError::AlreadyBound {
            namespace: "Weather".into(),
        };
        assert_eq!(err.kind(), ExErrorKind::Configuration);
        assert_eq!(err.to_string(), "[Weather] is already bound to a union");
    }

    #[test]
    fn test_no_match_carries_rejected_variants() {
        let err = UnionError::NoMatch {
            union: "Weather<[Warm]>".into(),
            rejections: vec![Rejection {
                variant: "Warm".into(),
                reason: "id mismatch".into(),
            }],
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::NoMatch);
        assert_eq!(ex.namespace(), Some("Weather<[Warm]>"));
        assert_eq!(ex.rejected(), Some(&["Warm".to_string()][..]));
    }

    #[test]
    fn test_rejected_none_by_default() {
        let err = ExError::new(ExErrorKind::NotFound);
        assert!(err.rejected().is_none());
    }

    #[test]
    fn test_display_includes_code_and_context() {
        let ex: ExError = UnionError::EmptyUnion {
            namespace: "Group".into(),
        }
        .into();
        let rendered = ex.to_string();
        assert!(rendered.starts_with("[ERR_EMPTY_UNION]"));
        assert!(rendered.contains("(namespace: Group)"));
    }

    #[test]
    fn test_toml_error_maps_to_serialization() {
        let parse: std::result::Result<toml::Value, _> = toml::from_str("include = [");
        let err: UnionError = parse.unwrap_err().into();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
    }
}

//! Muninn error types

/// Muninn error types
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    // Configuration errors (fatal, construction-time)
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no cache provider configured")]
    NoProvider,

    /// A method-name pattern registered against the method registry matched
    /// no known method. Always a configuration-time failure, never deferred
    /// to the first intercepted call.
    #[error("no method matching '{0}'")]
    NoMatchingMethod(String),

    // Model validation errors (provider-side, construction-time)
    #[error("invalid caching model: {0}")]
    InvalidCachingModel(String),

    #[error("invalid flushing model: {0}")]
    InvalidFlushingModel(String),

    /// A flat-string model failed to parse through the provider's model
    /// editor.
    #[error("cannot parse cache model '{text}': {reason}")]
    ModelParse { text: String, reason: String },

    // Runtime provider errors
    #[error("unknown cache region: {0}")]
    UnknownRegion(String),

    #[error("cache provider error: {0}")]
    Provider(String),
}

/// Result type alias for muninn operations
pub type Result<T> = std::result::Result<T, CacheError>;

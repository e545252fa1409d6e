//! Error types for payment app discovery.
//!
//! Every failure the engine can observe has a variant here. Discovery itself
//! never surfaces these to its caller: a failed fetch, parse, verification or
//! policy check degrades to "this method/app combination is not verified" and
//! is only visible in logs. The variants exist so each stage can report *why*
//! it said no.

/// Error codes for FFI and host integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum WebPayErrorCode {
    /// Method identifier is neither a registered token nor a secure URL
    ClassificationRejected = 1000,
    /// Manifest download failed
    Fetch = 2000,
    /// Manifest download timed out
    FetchTimeout = 2001,
    /// Manifest body is malformed
    Parse = 3000,
    /// App does not match a declared default application
    VerificationMismatch = 4000,
    /// Origin policy denies the method to the app
    PolicyDenied = 5000,
    /// Discovery was cancelled
    Cancelled = 6000,
    /// Invalid configuration
    Config = 7000,
    /// Feature not compiled in
    Unimplemented = 8000,
    /// Internal/unexpected error
    Internal = 9999,
}

/// Which of the two manifest formats a parse failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    /// Document served at a payment method URL.
    PaymentMethod,
    /// Document describing a native app's identity.
    WebApp,
}

impl std::fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PaymentMethod => write!(f, "payment method manifest"),
            Self::WebApp => write!(f, "web app manifest"),
        }
    }
}

/// Error type for discovery operations.
#[derive(Debug, thiserror::Error)]
pub enum WebPayError {
    /// The merchant supplied a method string that is not usable.
    #[error("rejected payment method identifier {raw:?}: {reason}")]
    ClassificationRejected {
        /// The string as supplied
        raw: String,
        /// Why it was rejected
        reason: String,
    },

    /// Network error or non-success HTTP status.
    #[error("failed to fetch {url}: {reason}")]
    Fetch {
        /// URL being fetched
        url: String,
        /// Underlying error message
        reason: String,
    },

    /// The fetch did not complete in time.
    #[error("fetching {url} timed out after {timeout_ms}ms")]
    FetchTimeout {
        /// URL being fetched
        url: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Malformed JSON or fields.
    #[error("invalid {kind}: {reason}")]
    Parse {
        /// Manifest format being parsed
        kind: ManifestKind,
        /// What was wrong
        reason: String,
    },

    /// The installed app does not match a related application declaration.
    #[error("{package} is not the declared application: {reason}")]
    VerificationMismatch {
        /// Installed package name
        package: String,
        /// First failed check
        reason: String,
    },

    /// The method's supported origins do not include the app.
    #[error("{method} is not available to {package}: {reason}")]
    PolicyDenied {
        /// Requested method
        method: String,
        /// Installed package name
        package: String,
        /// Why the policy said no
        reason: String,
    },

    /// The hosting request was abandoned.
    #[error("discovery cancelled")]
    Cancelled,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Feature not compiled in.
    #[error("{0} is not available in this build")]
    Unimplemented(&'static str),

    /// Internal/unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WebPayError {
    /// Get the error code for FFI/host integration.
    pub fn code(&self) -> WebPayErrorCode {
        match self {
            Self::ClassificationRejected { .. } => WebPayErrorCode::ClassificationRejected,
            Self::Fetch { .. } => WebPayErrorCode::Fetch,
            Self::FetchTimeout { .. } => WebPayErrorCode::FetchTimeout,
            Self::Parse { .. } => WebPayErrorCode::Parse,
            Self::VerificationMismatch { .. } => WebPayErrorCode::VerificationMismatch,
            Self::PolicyDenied { .. } => WebPayErrorCode::PolicyDenied,
            Self::Cancelled => WebPayErrorCode::Cancelled,
            Self::Config(_) => WebPayErrorCode::Config,
            Self::Unimplemented(_) => WebPayErrorCode::Unimplemented,
            Self::Internal(_) => WebPayErrorCode::Internal,
        }
    }

    /// Returns true if a later attempt could plausibly succeed.
    ///
    /// Discovery never retries within a run; hosts may use this to decide
    /// whether re-running discovery is worthwhile.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::FetchTimeout { .. })
    }

    /// Create a fetch error.
    pub fn fetch(url: impl ToString, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(kind: ManifestKind, reason: impl Into<String>) -> Self {
        Self::Parse {
            kind,
            reason: reason.into(),
        }
    }

    /// Create a classification rejection.
    pub fn rejected(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ClassificationRejected {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Create a verification mismatch.
    pub fn mismatch(package: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::VerificationMismatch {
            package: package.into(),
            reason: reason.into(),
        }
    }

    /// Create a policy denial.
    pub fn denied(
        method: impl Into<String>,
        package: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::PolicyDenied {
            method: method.into(),
            package: package.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for WebPayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("serialization: {err}"))
    }
}

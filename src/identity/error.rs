use std::fmt;

/// Why a request could not be authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization: Bearer` credential on the request.
    MissingCredential,
    /// The token's `exp` is in the past.
    Expired,
    /// Signature, issuer, audience or shape did not check out.
    Invalid(String),
    /// The verification keys could not be obtained.
    KeysUnavailable(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredential => write!(f, "missing bearer credential"),
            AuthError::Expired => write!(f, "token expired"),
            AuthError::Invalid(msg) => write!(f, "invalid token: {}", msg),
            AuthError::KeysUnavailable(msg) => {
                write!(f, "verification keys unavailable: {}", msg)
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid(err.to_string()),
        }
    }
}

/// Failure talking to the identity provider's directory.
#[derive(Debug)]
pub enum DirectoryError {
    /// The directory is not configured for this call.
    NotConfigured(&'static str),
    /// Transport failure or timeout.
    Request(reqwest::Error),
    /// The provider answered with a non-success status.
    Status(u16),
    /// The provider's response could not be interpreted.
    Malformed(String),
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::NotConfigured(what) => write!(f, "directory not configured: {}", what),
            DirectoryError::Request(e) => write!(f, "directory request failed: {}", e),
            DirectoryError::Status(code) => write!(f, "directory responded with status {}", code),
            DirectoryError::Malformed(msg) => write!(f, "malformed directory response: {}", msg),
        }
    }
}

impl std::error::Error for DirectoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DirectoryError::Request(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        DirectoryError::Request(err)
    }
}

//! identity - who is calling, and what we know about other users.
//!
//! - [`TokenVerifier`] checks a bearer JWT against the configured issuer,
//!   audience and keys (HS256 secret or the provider's JWKS).
//! - [`Session`] carries the verified claims for one request. It is the only
//!   place caller identity comes from.
//! - [`IdentityDirectory`] looks up display profiles, either from the OpenID
//!   provider ([`KeycloakDirectory`]) or from a fixed list ([`StaticDirectory`]).

mod directory;
mod error;
mod keycloak;
mod session;
mod verifier;

pub use directory::{IdentityDirectory, StaticDirectory, UserProfile};
pub use error::{AuthError, DirectoryError};
pub use keycloak::KeycloakDirectory;
pub use session::Session;
pub use verifier::{Claims, TokenVerifier};

/// Compare two subject identifiers the way the identity provider does:
/// case-insensitively.
pub fn same_subject(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

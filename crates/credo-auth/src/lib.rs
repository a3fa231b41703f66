//! Credential authority, signed tokens, and session lifecycle.
//!
//! Ed25519-signed bearer tokens (JWT, EdDSA) encoding a session's identity
//! and grants, plus the session lifecycle that mints and rotates them.
//!
//! ## Identity Types
//!
//! - [`UserHandle`] — Validated, normalized user handle
//! - [`User`] — Collaborator-supplied identity (id + handle)
//! - [`Session`] — Persisted session for rotation and revocation
//!
//! ## Credentials
//!
//! - [`AccessToken`] / [`RefreshToken`] — Validated claim sets
//! - [`ServerKey`] — Ed25519 signing and verification authority
//! - [`Params`] — Exported keypair material (PEM, DER, JWK)
//! - [`Sessions`] — Issuance and renewal
//! - [`KeyRepository`] — Keypair generation, persistence, retrieval
mod claims;
mod crypto;
mod dto;
mod error;
mod identity;
mod keys;
mod service;
mod session;
mod token;

pub use claims::*;
pub use crypto::*;
pub use dto::*;
pub use error::*;
pub use identity::*;
pub use keys::*;
pub use service::*;
pub use session::*;
pub use token::*;

#[cfg(feature = "database")]
mod repository;
#[cfg(feature = "database")]
pub use repository::*;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod middleware;
#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use middleware::*;

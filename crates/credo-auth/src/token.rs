use super::*;
use credo_core::ID;
use credo_core::UnixMillis;
use credo_core::now_millis;
use std::collections::HashSet;

/// Short-lived bearer credential authorizing requests.
///
/// Every field is mandatory; absence at the wire boundary is an error, not
/// a default. Instances are never mutated after construction; renewal
/// produces new instances.
#[derive(Debug, Clone)]
pub struct AccessToken {
    issuer: String,
    audience: Vec<String>,
    handle: UserHandle,
    session: ID<Session>,
    scopes: Vec<String>,
    issued: UnixMillis,
    expires: UnixMillis,
}

impl AccessToken {
    /// Validates claim completeness and expiry ordering.
    pub fn new(
        issuer: String,
        audience: Vec<String>,
        handle: UserHandle,
        session: ID<Session>,
        scopes: Vec<String>,
        issued: UnixMillis,
        expires: UnixMillis,
    ) -> Result<Self, AuthError> {
        if issuer.is_empty() {
            Err(AuthError::Construction(String::from(
                "issuer must not be empty",
            )))
        } else if audience.is_empty() {
            Err(AuthError::Construction(String::from(
                "audience must not be empty",
            )))
        } else if scopes.is_empty() {
            Err(AuthError::Construction(String::from(
                "scope must not be empty",
            )))
        } else if expires <= issued {
            Err(AuthError::Construction(format!(
                "expiry {} not after issuance {}",
                expires, issued
            )))
        } else {
            Ok(Self {
                issuer,
                audience,
                handle,
                session,
                scopes,
                issued,
                expires,
            })
        }
    }
    pub fn issuer(&self) -> &str {
        &self.issuer
    }
    pub fn audience(&self) -> &[String] {
        &self.audience
    }
    pub fn handle(&self) -> &UserHandle {
        &self.handle
    }
    pub fn session(&self) -> ID<Session> {
        self.session
    }
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
    pub fn issued_at(&self) -> UnixMillis {
        self.issued
    }
    pub fn expires_at(&self) -> UnixMillis {
        self.expires
    }
    /// Whether the expiry instant has passed.
    pub fn expired(&self) -> bool {
        self.expires < now_millis()
    }
}

// audience order carries no meaning; serialization order is preserved but
// equality compares it as a set
impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        let ours: HashSet<&str> = self.audience.iter().map(String::as_str).collect();
        let theirs: HashSet<&str> = other.audience.iter().map(String::as_str).collect();
        self.issuer == other.issuer
            && ours == theirs
            && self.handle == other.handle
            && self.session == other.session
            && self.scopes == other.scopes
            && self.issued == other.issued
            && self.expires == other.expires
    }
}
impl Eq for AccessToken {}

/// Longer-lived credential exchanged for a fresh token pair without
/// re-authentication.
///
/// Shares the access-token claim shape: a refresh token exists only if an
/// access token could be built from the identical claim set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken(AccessToken);

impl RefreshToken {
    pub fn new(
        issuer: String,
        audience: Vec<String>,
        handle: UserHandle,
        session: ID<Session>,
        scopes: Vec<String>,
        issued: UnixMillis,
        expires: UnixMillis,
    ) -> Result<Self, AuthError> {
        AccessToken::new(issuer, audience, handle, session, scopes, issued, expires).map(Self)
    }
    pub fn issuer(&self) -> &str {
        self.0.issuer()
    }
    pub fn audience(&self) -> &[String] {
        self.0.audience()
    }
    pub fn handle(&self) -> &UserHandle {
        self.0.handle()
    }
    pub fn session(&self) -> ID<Session> {
        self.0.session()
    }
    pub fn scopes(&self) -> &[String] {
        self.0.scopes()
    }
    pub fn issued_at(&self) -> UnixMillis {
        self.0.issued_at()
    }
    pub fn expires_at(&self) -> UnixMillis {
        self.0.expires_at()
    }
    pub fn expired(&self) -> bool {
        self.0.expired()
    }
    /// The shared claim set, as the access-token shape it derives from.
    pub(crate) fn claims(&self) -> &AccessToken {
        &self.0
    }
}

impl From<AccessToken> for RefreshToken {
    fn from(claims: AccessToken) -> Self {
        Self(claims)
    }
}

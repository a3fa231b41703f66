use super::*;
use credo_core::ACCESS_TOKEN_TTL;
use credo_core::AUDIENCE;
use credo_core::DEFAULT_SCOPES;
use credo_core::ID;
use credo_core::ISSUER;
use credo_core::REFRESH_TOKEN_TTL;
use credo_core::UnixMillis;
use credo_core::now_millis;
use credo_core::parse_duration;

/// Freshly minted token pair: both records plus their signed strings.
#[derive(Debug, Clone)]
pub struct Issued {
    pub access: AccessToken,
    pub refresh: RefreshToken,
    pub access_jwt: String,
    pub refresh_jwt: String,
}

impl Issued {
    /// Store row for this issuance: session keyed by id, current refresh
    /// hash, refresh horizon.
    pub fn record(&self, user: ID<User>) -> Session {
        Session::new(
            self.access.session(),
            user,
            ServerKey::hash(&self.refresh_jwt),
            self.refresh.expires_at(),
        )
    }
}

/// Session issuance and renewal.
///
/// Decides when a session begins and what claims a fresh pair carries; the
/// authority only signs what it is handed. Scope policy belongs to the
/// composition root, defaulted here and overridable from the environment.
pub struct Sessions {
    key: ServerKey,
    issuer: String,
    audience: Vec<String>,
    scopes: Vec<String>,
    access_ttl: std::time::Duration,
    refresh_ttl: std::time::Duration,
}

impl Sessions {
    /// Issuance policy from workspace defaults.
    pub fn new(key: ServerKey) -> Self {
        Self {
            key,
            issuer: ISSUER.to_string(),
            audience: vec![AUDIENCE.to_string()],
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            access_ttl: ACCESS_TOKEN_TTL,
            refresh_ttl: REFRESH_TOKEN_TTL,
        }
    }

    /// Issuance policy from the environment, falling back to defaults.
    /// TTLs accept the `30s`/`5m`/`2h`/`1d` syntax.
    pub fn from_env(key: ServerKey) -> Self {
        let mut this = Self::new(key);
        if let Ok(issuer) = std::env::var("CREDO_ISSUER") {
            this.issuer = issuer;
        }
        if let Ok(audience) = std::env::var("CREDO_AUDIENCE") {
            this.audience = audience.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(scopes) = std::env::var("CREDO_SCOPES") {
            this.scopes = scopes.split_whitespace().map(String::from).collect();
        }
        if let Some(ttl) = std::env::var("CREDO_ACCESS_TTL")
            .ok()
            .as_deref()
            .and_then(parse_duration)
        {
            this.access_ttl = ttl;
        }
        if let Some(ttl) = std::env::var("CREDO_REFRESH_TTL")
            .ok()
            .as_deref()
            .and_then(parse_duration)
        {
            this.refresh_ttl = ttl;
        }
        this
    }

    pub fn key(&self) -> &ServerKey {
        &self.key
    }

    /// Begins a new session: fresh session id, two expiry horizons, two
    /// signatures. Two sessions for the same user are independent and both
    /// independently revocable.
    pub fn create(&self, user: &User) -> Result<Issued, AuthError> {
        self.issue(
            user.handle().clone(),
            ID::default(),
            self.scopes.clone(),
            now_millis(),
        )
    }

    /// Exchanges a valid refresh token for a new pair, preserving session
    /// identity and grants with fresh issuance and expiry instants.
    /// Verification failures, including expiry, propagate unchanged.
    pub fn renew(&self, refresh: &str) -> Result<Issued, AuthError> {
        let old = self.key.verify_refresh(refresh)?;
        self.issue(
            old.handle().clone(),
            old.session(),
            old.scopes().to_vec(),
            now_millis(),
        )
    }

    fn issue(
        &self,
        handle: UserHandle,
        session: ID<Session>,
        scopes: Vec<String>,
        now: UnixMillis,
    ) -> Result<Issued, AuthError> {
        let access = AccessToken::new(
            self.issuer.clone(),
            self.audience.clone(),
            handle.clone(),
            session,
            scopes.clone(),
            now,
            now + self.access_ttl.as_millis() as UnixMillis,
        )?;
        let refresh = RefreshToken::new(
            self.issuer.clone(),
            self.audience.clone(),
            handle,
            session,
            scopes,
            now,
            now + self.refresh_ttl.as_millis() as UnixMillis,
        )?;
        let access_jwt = self.key.sign_access(&access)?;
        let refresh_jwt = self.key.sign_refresh(&refresh)?;
        Ok(Issued {
            access,
            refresh,
            access_jwt,
            refresh_jwt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credo_core::Unique;

    fn sessions() -> Sessions {
        Sessions::new(ServerKey::new(ServerKey::generate()).unwrap())
    }

    fn alice() -> User {
        User::new(ID::default(), UserHandle::new("alice").unwrap())
    }

    #[test]
    fn created_session_roundtrips() {
        let sessions = sessions();
        let issued = sessions.create(&alice()).unwrap();
        let access = sessions.key().verify_access(&issued.access_jwt).unwrap();
        assert_eq!(access.handle().value(), "alice");
        let refresh = sessions.key().verify_refresh(&issued.refresh_jwt).unwrap();
        assert_eq!(refresh.session(), access.session());
    }

    #[test]
    fn each_creation_is_a_fresh_session() {
        let sessions = sessions();
        let user = alice();
        let first = sessions.create(&user).unwrap();
        let second = sessions.create(&user).unwrap();
        assert_ne!(first.access.session(), second.access.session());
    }

    #[test]
    fn horizons_are_independent() {
        let issued = sessions().create(&alice()).unwrap();
        assert_eq!(issued.access.issued_at(), issued.refresh.issued_at());
        assert!(issued.refresh.expires_at() > issued.access.expires_at());
    }

    #[test]
    fn renewal_preserves_identity_and_grants() {
        let sessions = sessions();
        let issued = sessions.create(&alice()).unwrap();
        let renewed = sessions.renew(&issued.refresh_jwt).unwrap();
        assert_eq!(renewed.access.session(), issued.access.session());
        assert_eq!(renewed.access.handle(), issued.access.handle());
        assert_eq!(renewed.access.scopes(), issued.access.scopes());
        assert!(renewed.access.issued_at() >= issued.access.issued_at());
    }

    #[test]
    fn renewal_rejects_an_access_token() {
        let sessions = sessions();
        let issued = sessions.create(&alice()).unwrap();
        assert!(sessions.renew(&issued.access_jwt).is_err());
    }

    #[test]
    fn renewal_rejects_garbage() {
        match sessions().renew("not-a-jwt") {
            Err(AuthError::InvalidParameter(_)) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn renewal_rejects_a_foreign_refresh_token() {
        let ours = sessions();
        let theirs = sessions();
        let issued = theirs.create(&alice()).unwrap();
        assert!(ours.renew(&issued.refresh_jwt).is_err());
    }

    #[test]
    fn record_digests_the_refresh_token() {
        let sessions = sessions();
        let user = alice();
        let issued = sessions.create(&user).unwrap();
        let record = issued.record(user.id());
        assert_eq!(record.id(), issued.access.session());
        assert_eq!(record.user(), user.id());
        assert_eq!(record.hash(), ServerKey::hash(&issued.refresh_jwt));
        assert_eq!(record.expires_at(), issued.refresh.expires_at());
    }
}

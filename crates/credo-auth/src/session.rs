use super::*;
use credo_core::ID;
use credo_core::UnixMillis;
use credo_core::Unique;

/// Persisted session for rotation and revocation bookkeeping.
///
/// `id` is the stable handle a store indexes by; `hash` digests the
/// currently-valid refresh token, so a superseded token stops matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: ID<Self>,
    user: ID<User>,
    hash: Vec<u8>,
    expires: UnixMillis,
    revoked: bool,
}

impl Unique for Session {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Session {
    pub fn new(id: ID<Self>, user: ID<User>, hash: Vec<u8>, expires: UnixMillis) -> Self {
        Self {
            id,
            user,
            hash,
            expires,
            revoked: false,
        }
    }
    /// Rebuild a record from stored fields.
    pub fn hydrate(
        id: ID<Self>,
        user: ID<User>,
        hash: Vec<u8>,
        expires: UnixMillis,
        revoked: bool,
    ) -> Self {
        Self {
            id,
            user,
            hash,
            expires,
            revoked,
        }
    }
    /// Renewal bookkeeping: same session, new refresh hash and horizon.
    pub fn rotated(&self, hash: Vec<u8>, expires: UnixMillis) -> Self {
        Self {
            id: self.id,
            user: self.user,
            hash,
            expires,
            revoked: self.revoked,
        }
    }
    pub fn user(&self) -> ID<User> {
        self.user
    }
    pub fn hash(&self) -> &[u8] {
        &self.hash
    }
    pub fn expires_at(&self) -> UnixMillis {
        self.expires
    }
    pub fn revoked(&self) -> bool {
        self.revoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_preserves_identity() {
        let session = Session::new(ID::default(), ID::default(), vec![1, 2, 3], 1_000);
        let rotated = session.rotated(vec![4, 5, 6], 2_000);
        assert_eq!(rotated.id(), session.id());
        assert_eq!(rotated.user(), session.user());
        assert_eq!(rotated.hash(), [4, 5, 6]);
        assert_eq!(rotated.expires_at(), 2_000);
        assert!(!rotated.revoked());
    }

    #[test]
    fn hydration_restores_revocation() {
        let session = Session::hydrate(ID::default(), ID::default(), vec![], 1_000, true);
        assert!(session.revoked());
    }
}

use super::*;
use credo_core::HANDLE_MAX;
use credo_core::ID;
use credo_core::Unique;

/// Validated, normalized user handle embedded in token claims.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserHandle(String);

impl UserHandle {
    /// Normalizes (trim + lowercase) and validates the raw handle.
    pub fn new(raw: &str) -> Result<Self, AuthError> {
        let handle = raw.trim().to_lowercase();
        if handle.is_empty() {
            Err(AuthError::Construction(String::from(
                "handle must not be empty",
            )))
        } else if handle.len() > HANDLE_MAX {
            Err(AuthError::Construction(format!(
                "handle exceeds {} bytes",
                HANDLE_MAX
            )))
        } else if !handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            Err(AuthError::Construction(format!(
                "handle has invalid characters: {}",
                handle
            )))
        } else {
            Ok(Self(handle))
        }
    }
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collaborator-supplied identity for session creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    id: ID<Self>,
    handle: UserHandle,
}

impl User {
    pub fn new(id: ID<Self>, handle: UserHandle) -> Self {
        Self { id, handle }
    }
    pub fn handle(&self) -> &UserHandle {
        &self.handle
    }
}

impl Unique for User {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_normalizes() {
        let handle = UserHandle::new("  Alice ").unwrap();
        assert_eq!(handle.value(), "alice");
    }

    #[test]
    fn empty_handle_rejected() {
        assert!(UserHandle::new("").is_err());
        assert!(UserHandle::new("   ").is_err());
    }

    #[test]
    fn oversized_handle_rejected() {
        assert!(UserHandle::new(&"a".repeat(HANDLE_MAX + 1)).is_err());
    }

    #[test]
    fn exotic_characters_rejected() {
        assert!(UserHandle::new("al ice").is_err());
        assert!(UserHandle::new("alice!").is_err());
        assert!(UserHandle::new("a@b.c").is_err());
    }

    #[test]
    fn plain_handles_accepted() {
        assert!(UserHandle::new("alice").is_ok());
        assert!(UserHandle::new("al-ice_99").is_ok());
    }
}

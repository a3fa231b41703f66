use super::*;
use credo_core::ID;
use credo_core::UnixMillis;
use credo_core::now_millis;

/// Discriminant claim value for access tokens.
pub const KIND_ACCESS: &str = "access";
/// Discriminant claim value for refresh tokens.
pub const KIND_REFRESH: &str = "refresh";

/// Wire-format claim set.
///
/// Access and refresh tokens serialize claim-for-claim identically; only
/// `typ` separates the two kinds, and verification of one kind structurally
/// rejects the other.
#[derive(Debug, serde::Serialize)]
pub struct Claims {
    pub iss: String,
    pub aud: Vec<String>,
    pub sub: String,
    pub sid: uuid::Uuid,
    pub scope: String,
    pub iat: UnixMillis,
    pub exp: UnixMillis,
    pub typ: &'static str,
}

impl Claims {
    pub fn access(token: &AccessToken) -> Self {
        Self::build(token, KIND_ACCESS)
    }
    pub fn refresh(token: &RefreshToken) -> Self {
        Self::build(token.claims(), KIND_REFRESH)
    }
    fn build(token: &AccessToken, typ: &'static str) -> Self {
        Self {
            iss: token.issuer().to_string(),
            aud: token.audience().to_vec(),
            sub: token.handle().value().to_string(),
            sid: token.session().inner(),
            scope: token.scopes().join(" "),
            iat: token.issued_at(),
            exp: token.expires_at(),
            typ,
        }
    }

    /// Ordered claim extraction over a signature-verified payload.
    ///
    /// The first missing or mistyped claim short-circuits with its own
    /// message; `sub` is routed through the [`UserHandle`] constructor and
    /// surfaces that constructor's message. After extraction the `typ`
    /// discriminant must match `kind` and `exp` must still be ahead of the
    /// clock.
    pub(crate) fn extract(payload: &serde_json::Value, kind: &str) -> Result<AccessToken, AuthError> {
        let iss = string(payload, "iss")?;
        let sub = string(payload, "sub")?;
        let handle = UserHandle::new(&sub).map_err(|e| e.parameter())?;
        let sid = string(payload, "sid")?;
        let sid = uuid::Uuid::parse_str(&sid)
            .map_err(|_| AuthError::InvalidParameter(String::from("malformed sid claim")))?;
        let scope = string(payload, "scope")?;
        let iat = integer(payload, "iat")?;
        let exp = integer(payload, "exp")?;
        let aud = strings(payload, "aud")?;
        let typ = string(payload, "typ")?;
        if typ != kind {
            return Err(AuthError::InvalidParameter(format!(
                "expected {} token, found {}",
                kind, typ
            )));
        }
        if exp < now_millis() {
            return Err(AuthError::Expired(exp));
        }
        AccessToken::new(
            iss,
            aud,
            handle,
            ID::from(sid),
            scope.split_whitespace().map(String::from).collect(),
            iat,
            exp,
        )
        .map_err(|e| e.parameter())
    }
}

fn string(payload: &serde_json::Value, name: &str) -> Result<String, AuthError> {
    match payload.get(name) {
        None => Err(AuthError::InvalidParameter(format!("no {} claim", name))),
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(AuthError::InvalidParameter(format!(
            "malformed {} claim",
            name
        ))),
    }
}

fn integer(payload: &serde_json::Value, name: &str) -> Result<UnixMillis, AuthError> {
    match payload.get(name) {
        None => Err(AuthError::InvalidParameter(format!("no {} claim", name))),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| AuthError::InvalidParameter(format!("malformed {} claim", name))),
    }
}

fn strings(payload: &serde_json::Value, name: &str) -> Result<Vec<String>, AuthError> {
    match payload.get(name) {
        None => Err(AuthError::InvalidParameter(format!("no {} claim", name))),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| AuthError::InvalidParameter(format!("malformed {} claim", name)))
            })
            .collect(),
        Some(_) => Err(AuthError::InvalidParameter(format!(
            "malformed {} claim",
            name
        ))),
    }
}

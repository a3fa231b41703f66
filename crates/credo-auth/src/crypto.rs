use super::*;

/// Exported keypair material: private key (PKCS#8 PEM), public key (SPKI
/// PEM), public key (DER), public key (JWK).
///
/// Owned by the [`ServerKey`] constructed from it; the private key never
/// leaves the two.
#[derive(Clone)]
pub struct Params {
    pub private_pem: String,
    pub public_pem: String,
    pub public_der: Vec<u8>,
    pub public_jwk: serde_json::Value,
}

impl Params {
    pub(crate) fn from_signing(key: &ed25519_dalek::SigningKey) -> Self {
        use base64::Engine;
        use pkcs8::EncodePrivateKey;
        use pkcs8::LineEnding;
        use pkcs8::spki::EncodePublicKey;
        let public = key.verifying_key();
        let private_pem = key
            .to_pkcs8_pem(LineEnding::LF)
            .expect("pkcs8 encode")
            .to_string();
        let public_pem = public
            .to_public_key_pem(LineEnding::LF)
            .expect("spki encode");
        let public_der = public.to_public_key_der().expect("spki encode").into_vec();
        let public_jwk = serde_json::json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "x": base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(public.as_bytes()),
        });
        Self {
            private_pem,
            public_pem,
            public_der,
            public_jwk,
        }
    }
}

// keep the private key out of logs
impl std::fmt::Debug for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Params")
            .field("public_jwk", &self.public_jwk)
            .finish_non_exhaustive()
    }
}

/// Credential authority: sole holder of the Ed25519 signing keypair, sole
/// producer and acceptor of token signatures.
///
/// Keys are parsed once at construction; the instance is immutable after
/// that and safe to share across concurrent sign and verify calls.
pub struct ServerKey {
    params: Params,
    encoding: jsonwebtoken::EncodingKey,
    decoding: jsonwebtoken::DecodingKey,
    validation: jsonwebtoken::Validation,
}

impl ServerKey {
    pub fn new(params: Params) -> Result<Self, AuthError> {
        let encoding = jsonwebtoken::EncodingKey::from_ed_pem(params.private_pem.as_bytes())?;
        let decoding = jsonwebtoken::DecodingKey::from_ed_pem(params.public_pem.as_bytes())?;
        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::EdDSA);
        // exp is in milliseconds and checked during claim extraction, not
        // by the library
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        Ok(Self {
            params,
            encoding,
            decoding,
            validation,
        })
    }

    /// Mints a fresh Ed25519 keypair and exports every representation.
    /// The only place new key material originates; not on the request path.
    pub fn generate() -> Params {
        use rand::Rng;
        let ref mut seed = [0u8; 32];
        rand::rng().fill(seed);
        Params::from_signing(&ed25519_dalek::SigningKey::from_bytes(seed))
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn sign_access(&self, token: &AccessToken) -> Result<String, AuthError> {
        self.sign(&Claims::access(token))
    }
    pub fn sign_refresh(&self, token: &RefreshToken) -> Result<String, AuthError> {
        self.sign(&Claims::refresh(token))
    }
    pub fn verify_access(&self, token: &str) -> Result<AccessToken, AuthError> {
        self.decode(token)
            .and_then(|payload| Claims::extract(&payload, KIND_ACCESS))
    }
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshToken, AuthError> {
        self.decode(token)
            .and_then(|payload| Claims::extract(&payload, KIND_REFRESH))
            .map(RefreshToken::from)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::EdDSA),
            claims,
            &self.encoding,
        )
        .map_err(AuthError::from)
    }
    fn decode(&self, token: &str) -> Result<serde_json::Value, AuthError> {
        jsonwebtoken::decode::<serde_json::Value>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(AuthError::from)
    }

    /// SHA-256 digest of a signed token string, for store bookkeeping.
    pub fn hash(token: &str) -> Vec<u8> {
        use sha2::Digest;
        sha2::Sha256::digest(token.as_bytes()).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credo_core::ID;
    use credo_core::now_millis;

    fn authority() -> (ServerKey, Params) {
        let params = ServerKey::generate();
        (ServerKey::new(params.clone()).unwrap(), params)
    }

    fn access(session: ID<Session>) -> AccessToken {
        let now = now_millis();
        AccessToken::new(
            String::from("credo"),
            vec![String::from("web"), String::from("api")],
            UserHandle::new("alice").unwrap(),
            session,
            vec![String::from("read"), String::from("write")],
            now,
            now + 60_000,
        )
        .unwrap()
    }

    #[test]
    fn access_token_roundtrips() {
        let (key, _) = authority();
        let token = access(ID::default());
        let jwt = key.sign_access(&token).unwrap();
        let back = key.verify_access(&jwt).unwrap();
        assert_eq!(token, back);
        assert_eq!(back.issued_at(), token.issued_at());
        assert_eq!(back.expires_at(), token.expires_at());
        assert_eq!(back.scopes(), token.scopes());
    }

    #[test]
    fn refresh_token_roundtrips() {
        let (key, _) = authority();
        let token = RefreshToken::from(access(ID::default()));
        let jwt = key.sign_refresh(&token).unwrap();
        let back = key.verify_refresh(&jwt).unwrap();
        assert_eq!(token, back);
    }

    #[test]
    fn tampered_signature_rejected() {
        let (key, _) = authority();
        let jwt = key.sign_access(&access(ID::default())).unwrap();
        let (payload, signature) = jwt.rsplit_once('.').unwrap();
        let flipped = match signature.as_bytes()[0] {
            b'A' => 'B',
            _ => 'A',
        };
        let tampered = format!("{}.{}{}", payload, flipped, &signature[1..]);
        match key.verify_access(&tampered) {
            Err(AuthError::InvalidParameter(_)) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn garbage_rejected() {
        let (key, _) = authority();
        match key.verify_access("not-a-jwt") {
            Err(AuthError::InvalidParameter(_)) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn missing_sub_claim_named_specifically() {
        let (key, params) = authority();
        let encoding = jsonwebtoken::EncodingKey::from_ed_pem(params.private_pem.as_bytes()).unwrap();
        let payload = serde_json::json!({
            "iss": "credo",
            "aud": ["credo:api"],
            "sid": uuid::Uuid::now_v7(),
            "iat": now_millis(),
            "typ": "access",
        });
        let jwt = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::EdDSA),
            &payload,
            &encoding,
        )
        .unwrap();
        match key.verify_access(&jwt) {
            Err(AuthError::InvalidParameter(s)) => assert_eq!(s, "no sub claim"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn expired_token_rejected_distinctly() {
        let (key, _) = authority();
        let stale = AccessToken::new(
            String::from("credo"),
            vec![String::from("credo:api")],
            UserHandle::new("alice").unwrap(),
            ID::default(),
            vec![String::from("read")],
            now_millis() - 120_000,
            now_millis() - 60_000,
        )
        .unwrap();
        let jwt = key.sign_access(&stale).unwrap();
        match key.verify_access(&jwt) {
            Err(AuthError::Expired(_)) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn access_token_is_not_a_refresh_token() {
        // the typ discriminant closes the shared-schema confusion vector
        let (key, _) = authority();
        let jwt = key.sign_access(&access(ID::default())).unwrap();
        match key.verify_refresh(&jwt) {
            Err(AuthError::InvalidParameter(s)) => {
                assert_eq!(s, "expected refresh token, found access")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn foreign_authority_rejected() {
        let (ours, _) = authority();
        let (theirs, _) = authority();
        let jwt = ours.sign_access(&access(ID::default())).unwrap();
        assert!(ours.verify_access(&jwt).is_ok());
        assert!(theirs.verify_access(&jwt).is_err());
    }

    #[test]
    fn generated_params_export_every_representation() {
        let params = ServerKey::generate();
        assert!(params.private_pem.contains("BEGIN PRIVATE KEY"));
        assert!(params.public_pem.contains("BEGIN PUBLIC KEY"));
        assert!(!params.public_der.is_empty());
        assert_eq!(params.public_jwk["kty"], "OKP");
        assert_eq!(params.public_jwk["crv"], "Ed25519");
        assert!(params.public_jwk["x"].is_string());
    }
}

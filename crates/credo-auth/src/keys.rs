use super::*;

const PRIVATE_PEM: &str = "server.key.pem";
const PUBLIC_PEM: &str = "server.pub.pem";

/// Filesystem-backed supplier of the one active signing keypair.
///
/// Generates and persists key material on first use, hands it off to the
/// [`ServerKey`] it returns, and retains no usable copy of its own.
pub struct KeyRepository {
    dir: std::path::PathBuf,
}

impl KeyRepository {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Key directory from the `CREDO_KEY_DIR` environment variable.
    pub fn from_env() -> Self {
        Self::new(std::env::var("CREDO_KEY_DIR").unwrap_or_else(|_| String::from("keys")))
    }

    /// Returns the active authority, generating and persisting a keypair on
    /// first use.
    ///
    /// # Panics
    ///
    /// Panics if key material cannot be read, written, or parsed. A process
    /// without a usable keypair cannot sign or verify anything.
    pub fn get(&self) -> ServerKey {
        let params = match self.load() {
            Some(params) => params,
            None => self.mint(),
        };
        ServerKey::new(params).expect("keypair material unusable")
    }

    // public material is re-derived from the private key; the persisted
    // public PEM exists for out-of-band consumers
    fn load(&self) -> Option<Params> {
        use pkcs8::DecodePrivateKey;
        let pem = std::fs::read_to_string(self.dir.join(PRIVATE_PEM)).ok()?;
        log::info!("loading signing key from {}", self.dir.display());
        let key =
            ed25519_dalek::SigningKey::from_pkcs8_pem(&pem).expect("undecodable signing key");
        Some(Params::from_signing(&key))
    }

    fn mint(&self) -> Params {
        log::info!("generating signing key in {}", self.dir.display());
        let params = ServerKey::generate();
        std::fs::create_dir_all(&self.dir).expect("create key directory");
        std::fs::write(self.dir.join(PRIVATE_PEM), &params.private_pem)
            .expect("persist private key");
        std::fs::write(self.dir.join(PUBLIC_PEM), &params.public_pem)
            .expect("persist public key");
        params
    }
}

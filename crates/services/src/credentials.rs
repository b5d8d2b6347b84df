use sha2::{Digest, Sha256};

/// Turns passwords into stored tokens and checks them again.
pub trait CredentialProvider: Send + Sync {
    fn hash(&self, password: &str) -> String;

    fn verify(&self, token: &str, password: &str) -> bool {
        self.hash(password) == token
    }
}

/// Unsalted SHA-256 hex digest, the format existing user files store.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Credentials;

impl CredentialProvider for Sha256Credentials {
    fn hash(&self, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_known_vector() {
        assert_eq!(
            Sha256Credentials.hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn verify_accepts_only_the_original_password() {
        let token = Sha256Credentials.hash("hunter2");
        assert!(Sha256Credentials.verify(&token, "hunter2"));
        assert!(!Sha256Credentials.verify(&token, "Hunter2"));
    }
}

/// Header carrying the admin key on moderation requests.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Decides whether a presented admin credential grants moderation access.
pub trait AdminVerifier: Send + Sync {
    fn verify(&self, presented: &str) -> bool;
}

/// Single shared secret loaded from configuration.
pub struct StaticKeyVerifier {
    key: String,
}

impl StaticKeyVerifier {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl std::fmt::Debug for StaticKeyVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKeyVerifier").finish_non_exhaustive()
    }
}

impl AdminVerifier for StaticKeyVerifier {
    fn verify(&self, presented: &str) -> bool {
        !self.key.is_empty() && presented == self.key
    }
}

use afx_core::auth::error::AuthError;
use afx_core::auth::port::PasswordVerifier;

/// # Summary
/// 基于 bcrypt 的密码校验器。
///
/// # Invariants
/// - `cost` 被限制在 bcrypt 接受的 4..=31 区间内。
pub struct BcryptVerifier {
    cost: u32,
}

impl BcryptVerifier {
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(4, 31),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordVerifier for BcryptVerifier {
    fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        bcrypt::verify(plaintext, hashed).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcrypt_round_trip() {
        let verifier = BcryptVerifier::new(4);
        let hashed = verifier.hash("correct horse").unwrap();
        assert_ne!(hashed, "correct horse");
        assert!(verifier.verify("correct horse", &hashed));
        assert!(!verifier.verify("battery staple", &hashed));
        assert!(!verifier.verify("correct horse", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_cost_is_clamped() {
        assert_eq!(BcryptVerifier::new(1).cost(), 4);
        assert_eq!(BcryptVerifier::new(99).cost(), 31);
    }
}

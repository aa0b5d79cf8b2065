use super::error::AuthError;

/// # Summary
/// 单向密码哈希与校验器。
///
/// # Invariants
/// - `hash` 的输出不可逆，且 `verify(p, hash(p)) == true`。
/// - 实例由装配层显式注入 [`Authenticator`](super::service::Authenticator)，不存在全局单例。
pub trait PasswordVerifier: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, AuthError>;

    /// 哈希格式非法时视为校验失败。
    fn verify(&self, plaintext: &str, hashed: &str) -> bool;
}

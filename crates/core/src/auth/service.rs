//! # 鉴权服务
//!
//! 状态流转：未认证 → 邮箱 + 密码 → 密码认证通过 → 使用创建用户时签发的 Token
//! 访问后续接口。

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::error::AuthError;
use super::port::PasswordVerifier;
use crate::account::entity::{NewUser, Token, User, validate_email};
use crate::common::{ValidationError, require_text};
use crate::store::error::StoreError;
use crate::store::port::{TokenStore, UserStore};

/// 生成新的不透明 Bearer Token。
pub fn mint_token() -> String {
    Uuid::new_v4().to_string()
}

/// # Summary
/// 从 `Authorization` 头中提取 Bearer Token。
///
/// # Returns
/// 头缺失返回 `MissingToken`，格式不是 `Bearer <token>` 返回 `MalformedHeader`。
/// 认证方案名不区分大小写 (RFC 7235)。
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingToken)?;
    let (scheme, token) = value
        .trim_start()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::MalformedHeader);
    }
    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

/// # Summary
/// 用户注册、密码登录与 Token 鉴权的统一入口。
///
/// # Invariants
/// - 密码只以 `verifier` 产生的哈希形式落库，比较也只经过 `verifier`。
/// - 每个用户在创建时签发且仅签发一个 Token。
pub struct Authenticator {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    verifier: Arc<dyn PasswordVerifier>,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        verifier: Arc<dyn PasswordVerifier>,
    ) -> Self {
        Self {
            users,
            tokens,
            verifier,
        }
    }

    /// # Summary
    /// 注册新用户并签发 Token。
    ///
    /// # Logic
    /// 1. 校验 `name` 与 `email`。
    /// 2. 邮箱已存在则返回 `EmailTaken`，不写入任何行。
    /// 3. 要求提供非空明文密码，并交由 `verifier` 哈希。
    /// 4. 用户与 Token 在同一事务中写入；并发注册同一邮箱时由唯一约束兜底，
    ///    同样映射为 `EmailTaken`。
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: Option<&str>,
    ) -> Result<User, AuthError> {
        require_text("name", name)?;
        let email = validate_email(email)?;

        if self.users.find_user_by_email(&email).await?.is_some() {
            warn!("Registration rejected, email already in use: {}", email);
            return Err(AuthError::EmailTaken(email));
        }

        let password = match password {
            Some(p) if !p.is_empty() => p,
            _ => return Err(ValidationError::missing("password").into()),
        };

        let hashed = self.verifier.hash(password)?;
        let new_user = NewUser::new(name, &email, hashed)?;
        let token = mint_token();

        let user = match self.users.create_user(&new_user, &token).await {
            Ok(user) => user,
            Err(StoreError::Conflict(_)) => return Err(AuthError::EmailTaken(email)),
            Err(e) => return Err(e.into()),
        };
        info!("User {} registered with id {}", user.email, user.id);
        Ok(user)
    }

    /// # Summary
    /// 邮箱 + 密码登录，返回该用户的 Token。
    ///
    /// # Logic
    /// 校验通过后优先返回创建时签发的 Token；历史数据中若缺失则补签一个。
    pub async fn login(&self, email: &str, password: &str) -> Result<Token, AuthError> {
        let user = self
            .users
            .find_user_by_email(email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verifier.verify(password, &user.password_hash) {
            warn!("Wrong password for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        match self.tokens.get_user_token(user.id).await? {
            Some(token) => Ok(token),
            None => {
                info!("User {} has no token, issuing one", user.id);
                Ok(self.tokens.issue_token(user.id, &mint_token()).await?)
            }
        }
    }

    /// 将 `Authorization` 头解析为唯一用户。
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<User, AuthError> {
        let token = parse_bearer(authorization)?;
        self.tokens
            .find_user_by_token(token)
            .await?
            .ok_or(AuthError::UnknownToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::entity::UserPatch;
    use crate::common::Id;
    use crate::portfolio::entity::{Stock, Team};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryAccounts {
        users: Mutex<Vec<User>>,
        tokens: Mutex<Vec<Token>>,
    }

    #[async_trait]
    impl UserStore for MemoryAccounts {
        async fn create_user(&self, user: &NewUser, token: &str) -> Result<User, StoreError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == user.email()) {
                return Err(StoreError::Conflict("email".into()));
            }
            let id = Id::try_from(users.len()).unwrap() + 1;
            let created = User {
                id,
                name: user.name().to_string(),
                email: user.email().to_string(),
                password_hash: user.password_hash().to_string(),
                token: Some(token.to_string()),
            };
            users.push(created.clone());
            let mut tokens = self.tokens.lock().unwrap();
            let token_id = Id::try_from(tokens.len()).unwrap() + 1;
            tokens.push(Token {
                id: token_id,
                token: token.to_string(),
                user_id: id,
            });
            Ok(created)
        }

        async fn get_user(&self, id: Id) -> Result<User, StoreError> {
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
        }

        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn update_user(&self, id: Id, _patch: &UserPatch) -> Result<User, StoreError> {
            self.get_user(id).await
        }

        async fn delete_user(&self, _id: Id) -> Result<(), StoreError> {
            Ok(())
        }

        async fn list_user_stocks(&self, _user_id: Id) -> Result<Vec<Stock>, StoreError> {
            Ok(Vec::new())
        }

        async fn list_user_teams(&self, _user_id: Id) -> Result<Vec<Team>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl TokenStore for MemoryAccounts {
        async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
            let user_id = self
                .tokens
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.token == token)
                .map(|t| t.user_id);
            match user_id {
                Some(id) => Ok(Some(self.get_user(id).await?)),
                None => Ok(None),
            }
        }

        async fn get_user_token(&self, user_id: Id) -> Result<Option<Token>, StoreError> {
            Ok(self
                .tokens
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|t| t.user_id == user_id)
                .cloned())
        }

        async fn issue_token(&self, user_id: Id, token: &str) -> Result<Token, StoreError> {
            let mut tokens = self.tokens.lock().unwrap();
            let issued = Token {
                id: Id::try_from(tokens.len()).unwrap() + 1,
                token: token.to_string(),
                user_id,
            };
            tokens.push(issued.clone());
            Ok(issued)
        }
    }

    struct PrefixVerifier;

    impl PasswordVerifier for PrefixVerifier {
        fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
            Ok(format!("hashed:{plaintext}"))
        }

        fn verify(&self, plaintext: &str, hashed: &str) -> bool {
            hashed.strip_prefix("hashed:") == Some(plaintext)
        }
    }

    fn authenticator() -> (Authenticator, Arc<MemoryAccounts>) {
        let store = Arc::new(MemoryAccounts::default());
        let auth = Authenticator::new(store.clone(), store.clone(), Arc::new(PrefixVerifier));
        (auth, store)
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer(Some("Bearer abc")).unwrap(), "abc");
        assert_eq!(parse_bearer(Some("bearer abc")).unwrap(), "abc");
        assert_eq!(parse_bearer(Some("BEARER  abc ")).unwrap(), "abc");
        assert!(matches!(parse_bearer(None), Err(AuthError::MissingToken)));
        assert!(matches!(
            parse_bearer(Some("Basic abc")),
            Err(AuthError::MalformedHeader)
        ));
        assert!(matches!(
            parse_bearer(Some("Bearerabc")),
            Err(AuthError::MalformedHeader)
        ));
        assert!(matches!(
            parse_bearer(Some("Bearer ")),
            Err(AuthError::MalformedHeader)
        ));
        assert!(matches!(
            parse_bearer(Some("Bearer a b")),
            Err(AuthError::MalformedHeader)
        ));
    }

    #[tokio::test]
    async fn test_register_hashes_password_and_mints_token() {
        let (auth, store) = authenticator();
        let user = auth
            .register("Ada", "ada@example.com", Some("s3cret"))
            .await
            .unwrap();

        assert_eq!(user.password_hash, "hashed:s3cret");
        let token = user.token.clone().unwrap();
        assert_eq!(store.tokens.lock().unwrap().len(), 1);

        let header = format!("Bearer {token}");
        let me = auth.authenticate(Some(&header)).await.unwrap();
        assert_eq!(me.name, "Ada");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email_and_missing_password() {
        let (auth, store) = authenticator();
        auth.register("Ada", "ada@example.com", Some("pw"))
            .await
            .unwrap();

        let dup = auth.register("Eve", "ada@example.com", Some("pw")).await;
        assert!(matches!(dup, Err(AuthError::EmailTaken(_))));

        let missing = auth.register("Bob", "bob@example.com", None).await;
        assert!(matches!(missing, Err(AuthError::Validation(_))));

        let empty = auth.register("Bob", "bob@example.com", Some("")).await;
        assert!(matches!(empty, Err(AuthError::Validation(_))));

        assert_eq!(store.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_login_returns_creation_token() {
        let (auth, _store) = authenticator();
        let user = auth
            .register("Ada", "ada@example.com", Some("pw"))
            .await
            .unwrap();

        let token = auth.login("ada@example.com", "pw").await.unwrap();
        assert_eq!(Some(token.token), user.token);

        assert!(matches!(
            auth.login("ada@example.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("ghost@example.com", "pw").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let (auth, _store) = authenticator();
        let res = auth.authenticate(Some("Bearer not-a-token")).await;
        assert!(matches!(res, Err(AuthError::UnknownToken)));
    }
}

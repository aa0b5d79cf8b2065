use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::{Id, ValidationError, require_text};

/// # Summary
/// 用户实体，交易模拟中的参与者。
///
/// # Invariants
/// - `email` 全局唯一（由存储层 UNIQUE 约束保证）。
/// - `password_hash` 只保存单向哈希，从不保存明文。
/// - `token` 为当前有效的 Bearer Token，在用户创建时签发。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub token: Option<String>,
}

/// # Summary
/// 待持久化的新用户。
///
/// # Invariants
/// - 只能通过 [`NewUser::new`] 构造，字段均已校验。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: String,
    password_hash: String,
}

impl NewUser {
    /// # Summary
    /// 校验并构造新用户。
    ///
    /// # Logic
    /// 1. `name` 去空白后不可为空。
    /// 2. `email` 去空白后不可为空且必须包含 `@`。
    /// 3. `password_hash` 不可为空（调用方负责先行哈希）。
    pub fn new(
        name: &str,
        email: &str,
        password_hash: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = require_text("name", name)?;
        let email = validate_email(email)?;
        let password_hash = password_hash.into();
        if password_hash.is_empty() {
            return Err(ValidationError::missing("password"));
        }
        Ok(Self {
            name,
            email,
            password_hash,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

/// 用户可更新字段白名单，目前只有显示名称。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserPatch {
    pub name: Option<String>,
}

impl UserPatch {
    /// 规整并校验所有出现的字段。
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self.name.map(|n| require_text("name", &n)).transpose()?,
        })
    }
}

/// # Summary
/// Bearer Token 实体，归属于唯一用户。
///
/// # Invariants
/// - `token` 全局唯一。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Token {
    pub id: Id,
    pub token: String,
    pub user_id: Id,
}

/// 去空白后校验邮箱格式 (`local@domain`)。
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = require_text("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(ValidationError::new("email", "must be an email address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_validation() {
        let user = NewUser::new(" Ada ", "ada@example.com", "$2b$hash").unwrap();
        assert_eq!(user.name(), "Ada");
        assert_eq!(user.email(), "ada@example.com");

        assert_eq!(
            NewUser::new("", "ada@example.com", "h").unwrap_err().field,
            "name"
        );
        assert_eq!(NewUser::new("Ada", "ada", "h").unwrap_err().field, "email");
        assert_eq!(NewUser::new("Ada", "@x", "h").unwrap_err().field, "email");
        assert_eq!(
            NewUser::new("Ada", "ada@example.com", "").unwrap_err().field,
            "password"
        );
    }

    #[test]
    fn test_user_patch_trims_name() {
        let patch = UserPatch {
            name: Some("  New ".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(patch.name.as_deref(), Some("New"));
        assert!(UserPatch { name: Some(" ".into()) }.validate().is_err());
        assert_eq!(UserPatch::default().validate().unwrap(), UserPatch::default());
    }

    #[test]
    fn test_user_json_round_trip() {
        let user = User {
            id: 42,
            name: "Grace".into(),
            email: "grace@example.com".into(),
            password_hash: "$2b$04$abc".into(),
            token: Some("8c7f".into()),
        };
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }
}

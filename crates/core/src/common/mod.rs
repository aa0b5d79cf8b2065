use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// 数据库自增主键。
pub type Id = i64;

/// # Summary
/// 输入校验错误，构造实体或应用 Patch 时字段缺失/非法。
///
/// # Invariants
/// - `field` 总是对应 JSON 中的字段名，便于客户端定位。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid field `{field}`: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    pub fn missing(field: &'static str) -> Self {
        Self::new(field, "is required")
    }
}

/// 去除首尾空白后要求非空，返回规整后的值。
pub fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// 外键字段必须是正整数。
pub fn require_id(field: &'static str, value: Id) -> Result<Id, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::new(field, "must be a positive identifier"));
    }
    Ok(value)
}

/// 可清空字段的反序列化：只要 JSON 中出现该字段（包括 `null`）就返回 `Some`。
///
/// 配合 `#[serde(default)]` 使用，字段缺失时保持 `None`。
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("name", "  Alice ").unwrap(), "Alice");
        let err = require_text("name", "   ").unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_require_id_rejects_non_positive() {
        assert!(require_id("owner_id", 0).is_err());
        assert!(require_id("owner_id", -3).is_err());
        assert_eq!(require_id("owner_id", 7).unwrap(), 7);
    }

    #[test]
    fn test_validation_error_message() {
        let err = ValidationError::missing("password");
        assert_eq!(err.to_string(), "invalid field `password`: is required");
    }
}

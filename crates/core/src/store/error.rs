use thiserror::Error;

/// # Summary
/// 存储层错误枚举，覆盖数据库故障、唯一性冲突、外键缺失、CHECK 约束与行解码失败。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 错误不具备重试语义，由调用方原样上抛。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 数据库操作失败
    #[error("Database error: {0}")]
    Database(String),
    /// 记录或其引用的记录不存在
    #[error("Not found: {0}")]
    NotFound(String),
    /// 唯一约束冲突，或删除仍被引用的记录
    #[error("Conflict: {0}")]
    Conflict(String),
    /// 写入的值违反表上的 CHECK 约束
    #[error("Invalid value: {0}")]
    Invalid(String),
    /// 数据库行无法还原为领域实体
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// 初始化存储失败
    #[error("Initialization error: {0}")]
    InitError(String),
}

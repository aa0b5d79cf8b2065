use super::error::StoreError;
use crate::account::entity::{NewUser, Token, User, UserPatch};
use crate::common::Id;
use crate::portfolio::entity::{
    NewStock, NewTeam, NewTransaction, Stock, StockPatch, Team, TeamPatch, Transaction,
    TransactionPatch,
};
use crate::post::entity::{NewPost, Post, PostPatch};
use async_trait::async_trait;

/// # Summary
/// 用户数据存储接口。
///
/// # Invariants
/// - `email` 唯一性由实现者在存储层保证，冲突返回 `StoreError::Conflict`。
/// - 查询结果中的 `User::token` 为该用户最新签发的 Token。
#[async_trait]
pub trait UserStore: Send + Sync {
    /// # Summary
    /// 创建用户并同时写入其首个 Token。
    ///
    /// # Logic
    /// 在同一个数据库事务中插入 `users` 与 `tokens` 两行，任一失败则整体回滚。
    ///
    /// # Arguments
    /// * `user`: 已校验的新用户。
    /// * `token`: 已生成的 Bearer Token 字符串。
    ///
    /// # Returns
    /// 持久化后的用户（含 `id` 与 `token`）。邮箱重复时返回 `Conflict`。
    async fn create_user(&self, user: &NewUser, token: &str) -> Result<User, StoreError>;

    /// 按 ID 获取用户，不存在返回 `NotFound`。
    async fn get_user(&self, id: Id) -> Result<User, StoreError>;

    /// 按邮箱查找用户。
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// 按白名单字段更新用户，返回更新后的实体。
    async fn update_user(&self, id: Id, patch: &UserPatch) -> Result<User, StoreError>;

    /// # Summary
    /// 删除用户。
    ///
    /// # Logic
    /// 其 Token 随之级联删除；若仍持有股票或参与交易，返回 `Conflict`。
    async fn delete_user(&self, id: Id) -> Result<(), StoreError>;

    /// 用户持有的股票 (children)。
    async fn list_user_stocks(&self, user_id: Id) -> Result<Vec<Stock>, StoreError>;

    /// 通过 `stocks` 关联表得到的用户所属球队 (siblings)，去重。
    async fn list_user_teams(&self, user_id: Id) -> Result<Vec<Team>, StoreError>;
}

/// # Summary
/// Bearer Token 存储接口。
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// 解析 Token 对应的唯一用户。
    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, StoreError>;

    /// 获取用户当前（最新）的 Token。
    async fn get_user_token(&self, user_id: Id) -> Result<Option<Token>, StoreError>;

    /// 为已存在的用户签发新 Token。
    async fn issue_token(&self, user_id: Id, token: &str) -> Result<Token, StoreError>;
}

/// 球队数据存储接口。
#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn create_team(&self, team: &NewTeam) -> Result<Team, StoreError>;
    async fn get_team(&self, id: Id) -> Result<Team, StoreError>;
    async fn list_teams(&self) -> Result<Vec<Team>, StoreError>;
    async fn update_team(&self, id: Id, patch: &TeamPatch) -> Result<Team, StoreError>;

    /// 删除球队。仍有股票引用时返回 `Conflict`，不做级联。
    async fn delete_team(&self, id: Id) -> Result<(), StoreError>;

    /// 球队下的全部股票，球队不存在返回 `NotFound`。
    async fn list_team_stocks(&self, team_id: Id) -> Result<Vec<Stock>, StoreError>;
}

/// # Summary
/// 股票数据存储接口。
///
/// # Invariants
/// - 写入时 `owner_id`/`team_id`/`transaction_id` 引用不存在的行返回 `NotFound`。
/// - 读取到引用悬空的行返回 `Serialization`。
#[async_trait]
pub trait StockStore: Send + Sync {
    async fn create_stock(&self, stock: &NewStock) -> Result<Stock, StoreError>;
    async fn get_stock(&self, id: Id) -> Result<Stock, StoreError>;
    async fn list_stocks(&self) -> Result<Vec<Stock>, StoreError>;
    async fn update_stock(&self, id: Id, patch: &StockPatch) -> Result<Stock, StoreError>;
    async fn delete_stock(&self, id: Id) -> Result<(), StoreError>;

    /// 股票的持有人 (parent)。
    async fn find_owner(&self, stock_id: Id) -> Result<User, StoreError>;

    /// 股票所属球队 (parent)。
    async fn find_team(&self, stock_id: Id) -> Result<Team, StoreError>;
}

/// 交易数据存储接口。
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction, StoreError>;
    async fn get_transaction(&self, id: Id) -> Result<Transaction, StoreError>;
    async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError>;
    async fn update_transaction(
        &self,
        id: Id,
        patch: &TransactionPatch,
    ) -> Result<Transaction, StoreError>;

    /// 删除交易，关联股票的 `transaction_id` 置空。
    async fn delete_transaction(&self, id: Id) -> Result<(), StoreError>;

    async fn list_transaction_stocks(&self, transaction_id: Id) -> Result<Vec<Stock>, StoreError>;
    async fn find_seller(&self, transaction_id: Id) -> Result<User, StoreError>;
    async fn find_buyer(&self, transaction_id: Id) -> Result<User, StoreError>;
}

/// 留言数据存储接口。
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, post: &NewPost) -> Result<Post, StoreError>;
    async fn get_post(&self, id: Id) -> Result<Post, StoreError>;
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;
    async fn update_post(&self, id: Id, patch: &PostPatch) -> Result<Post, StoreError>;

    /// 整体替换内容 (PUT 语义)。
    async fn replace_post(&self, id: Id, post: &NewPost) -> Result<Post, StoreError>;
    async fn delete_post(&self, id: Id) -> Result<(), StoreError>;

    /// 清空全部留言，返回删除的行数。
    async fn clear_posts(&self) -> Result<u64, StoreError>;
}

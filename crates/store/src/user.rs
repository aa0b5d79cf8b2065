use afx_core::account::entity::{NewUser, Token, User, UserPatch};
use afx_core::common::Id;
use afx_core::portfolio::entity::{Stock, Team};
use afx_core::store::error::StoreError;
use afx_core::store::port::{TokenStore, UserStore};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;

use crate::db::{
    SqliteStore, column, db_err, delete_err, ensure_exists, expect_affected, optional_column,
    write_err,
};
use crate::migration::Preparation;
use crate::stock::{STOCK_SELECT, decode_stock};
use crate::team::decode_team;

pub(crate) const USERS_PREPARATION: Preparation = Preparation {
    table: "users",
    create: r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        );
    "#,
};

pub(crate) const TOKENS_PREPARATION: Preparation = Preparation {
    table: "tokens",
    create: r#"
        CREATE TABLE IF NOT EXISTS tokens (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            token TEXT NOT NULL UNIQUE,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_tokens_user_id ON tokens(user_id);
    "#,
};

/// `token` 列取该用户最新签发的一条。
const USER_SELECT: &str = r#"
    SELECT u.id, u.name, u.email, u.password,
           (SELECT t.token FROM tokens t WHERE t.user_id = u.id ORDER BY t.id DESC LIMIT 1) AS token
    FROM users u
"#;

pub(crate) fn decode_user(row: &SqliteRow) -> Result<User, StoreError> {
    Ok(User {
        id: column(row, "id")?,
        name: column(row, "name")?,
        email: column(row, "email")?,
        password_hash: column(row, "password")?,
        token: optional_column(row, "token")?,
    })
}

fn decode_token(row: &SqliteRow) -> Result<Token, StoreError> {
    Ok(Token {
        id: column(row, "id")?,
        token: column(row, "token")?,
        user_id: column(row, "user_id")?,
    })
}

#[async_trait]
impl UserStore for SqliteStore {
    /// # Summary
    /// 在单个事务中写入用户及其首个 Token。
    ///
    /// # Logic
    /// 1. 插入 `users`，邮箱唯一约束冲突映射为 `Conflict`。
    /// 2. 以新用户的 rowid 插入 `tokens`。
    /// 3. 提交事务；任一步失败事务随 drop 回滚。
    async fn create_user(&self, user: &NewUser, token: &str) -> Result<User, StoreError> {
        let mut tx = self.pool().begin().await.map_err(db_err)?;

        let id = sqlx::query("INSERT INTO users (name, email, password) VALUES (?, ?, ?)")
            .bind(user.name())
            .bind(user.email())
            .bind(user.password_hash())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?
            .last_insert_rowid();

        sqlx::query("INSERT INTO tokens (token, user_id) VALUES (?, ?)")
            .bind(token)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        Ok(User {
            id,
            name: user.name().to_string(),
            email: user.email().to_string(),
            password_hash: user.password_hash().to_string(),
            token: Some(token.to_string()),
        })
    }

    async fn get_user(&self, id: Id) -> Result<User, StoreError> {
        let sql = format!("{} WHERE u.id = ?", USER_SELECT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
        decode_user(&row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("{} WHERE u.email = ?", USER_SELECT);
        sqlx::query(&sql)
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?
            .as_ref()
            .map(decode_user)
            .transpose()
    }

    async fn update_user(&self, id: Id, patch: &UserPatch) -> Result<User, StoreError> {
        let result = sqlx::query("UPDATE users SET name = COALESCE(?, name) WHERE id = ?")
            .bind(patch.name.as_deref())
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        expect_affected(result.rows_affected(), "user", id)?;
        self.get_user(id).await
    }

    async fn delete_user(&self, id: Id) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| {
                delete_err(
                    e,
                    &format!("user {} still owns stocks or takes part in transactions", id),
                )
            })?;
        expect_affected(result.rows_affected(), "user", id)
    }

    async fn list_user_stocks(&self, user_id: Id) -> Result<Vec<Stock>, StoreError> {
        ensure_exists(self.pool(), "users", "user", user_id).await?;
        let sql = format!("{} WHERE s.owner_id = ? ORDER BY s.id", STOCK_SELECT);
        sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?
            .iter()
            .map(decode_stock)
            .collect()
    }

    async fn list_user_teams(&self, user_id: Id) -> Result<Vec<Team>, StoreError> {
        ensure_exists(self.pool(), "users", "user", user_id).await?;
        sqlx::query(
            r#"
            SELECT DISTINCT t.id, t.name
            FROM teams t
            JOIN stocks s ON s.team_id = t.id
            WHERE s.owner_id = ?
            ORDER BY t.id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?
        .iter()
        .map(decode_team)
        .collect()
    }
}

#[async_trait]
impl TokenStore for SqliteStore {
    async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "{} WHERE u.id = (SELECT user_id FROM tokens WHERE token = ?)",
            USER_SELECT
        );
        sqlx::query(&sql)
            .bind(token)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?
            .as_ref()
            .map(decode_user)
            .transpose()
    }

    async fn get_user_token(&self, user_id: Id) -> Result<Option<Token>, StoreError> {
        sqlx::query(
            "SELECT id, token, user_id FROM tokens WHERE user_id = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?
        .as_ref()
        .map(decode_token)
        .transpose()
    }

    async fn issue_token(&self, user_id: Id, token: &str) -> Result<Token, StoreError> {
        let id = sqlx::query("INSERT INTO tokens (token, user_id) VALUES (?, ?)")
            .bind(token)
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(|e| write_err(e, &format!("user {}", user_id)))?
            .last_insert_rowid();
        Ok(Token {
            id,
            token: token.to_string(),
            user_id,
        })
    }
}

use afx_core::common::Id;
use afx_core::post::entity::{NewPost, Post, PostPatch};
use afx_core::store::error::StoreError;
use afx_core::store::port::PostStore;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;

use crate::db::{SqliteStore, column, db_err, expect_affected};
use crate::migration::Preparation;

pub(crate) const PREPARATION: Preparation = Preparation {
    table: "posts",
    create: r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL
        );
    "#,
};

fn decode_post(row: &SqliteRow) -> Result<Post, StoreError> {
    Ok(Post {
        id: column(row, "id")?,
        content: column(row, "content")?,
    })
}

#[async_trait]
impl PostStore for SqliteStore {
    async fn create_post(&self, post: &NewPost) -> Result<Post, StoreError> {
        let id = sqlx::query("INSERT INTO posts (content) VALUES (?)")
            .bind(post.content())
            .execute(self.pool())
            .await
            .map_err(db_err)?
            .last_insert_rowid();
        Ok(Post {
            id,
            content: post.content().to_string(),
        })
    }

    async fn get_post(&self, id: Id) -> Result<Post, StoreError> {
        let row = sqlx::query("SELECT id, content FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::NotFound(format!("post {}", id)))?;
        decode_post(&row)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        sqlx::query("SELECT id, content FROM posts ORDER BY id")
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?
            .iter()
            .map(decode_post)
            .collect()
    }

    async fn update_post(&self, id: Id, patch: &PostPatch) -> Result<Post, StoreError> {
        let result = sqlx::query("UPDATE posts SET content = COALESCE(?, content) WHERE id = ?")
            .bind(patch.content.as_deref())
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        expect_affected(result.rows_affected(), "post", id)?;
        self.get_post(id).await
    }

    async fn replace_post(&self, id: Id, post: &NewPost) -> Result<Post, StoreError> {
        let result = sqlx::query("UPDATE posts SET content = ? WHERE id = ?")
            .bind(post.content())
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        expect_affected(result.rows_affected(), "post", id)?;
        Ok(Post {
            id,
            content: post.content().to_string(),
        })
    }

    async fn delete_post(&self, id: Id) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        expect_affected(result.rows_affected(), "post", id)
    }

    async fn clear_posts(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM posts")
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }
}

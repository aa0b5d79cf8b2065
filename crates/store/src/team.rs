use afx_core::common::Id;
use afx_core::portfolio::entity::{NewTeam, Stock, Team, TeamPatch};
use afx_core::store::error::StoreError;
use afx_core::store::port::TeamStore;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;

use crate::db::{SqliteStore, column, db_err, delete_err, ensure_exists, expect_affected};
use crate::migration::Preparation;
use crate::stock::{STOCK_SELECT, decode_stock};

pub(crate) const PREPARATION: Preparation = Preparation {
    table: "teams",
    create: r#"
        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL CHECK (length(name) > 0)
        );
    "#,
};

pub(crate) fn decode_team(row: &SqliteRow) -> Result<Team, StoreError> {
    Ok(Team {
        id: column(row, "id")?,
        name: column(row, "name")?,
    })
}

#[async_trait]
impl TeamStore for SqliteStore {
    async fn create_team(&self, team: &NewTeam) -> Result<Team, StoreError> {
        let id = sqlx::query("INSERT INTO teams (name) VALUES (?)")
            .bind(team.name())
            .execute(self.pool())
            .await
            .map_err(db_err)?
            .last_insert_rowid();
        Ok(Team {
            id,
            name: team.name().to_string(),
        })
    }

    async fn get_team(&self, id: Id) -> Result<Team, StoreError> {
        let row = sqlx::query("SELECT id, name FROM teams WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::NotFound(format!("team {}", id)))?;
        decode_team(&row)
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        sqlx::query("SELECT id, name FROM teams ORDER BY id")
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?
            .iter()
            .map(decode_team)
            .collect()
    }

    async fn update_team(&self, id: Id, patch: &TeamPatch) -> Result<Team, StoreError> {
        let result = sqlx::query("UPDATE teams SET name = COALESCE(?, name) WHERE id = ?")
            .bind(patch.name.as_deref())
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        expect_affected(result.rows_affected(), "team", id)?;
        self.get_team(id).await
    }

    /// `stocks.team_id` 外键不级联，仍有股票时删除失败。
    async fn delete_team(&self, id: Id) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| delete_err(e, &format!("team {} still has stocks", id)))?;
        expect_affected(result.rows_affected(), "team", id)
    }

    async fn list_team_stocks(&self, team_id: Id) -> Result<Vec<Stock>, StoreError> {
        ensure_exists(self.pool(), "teams", "team", team_id).await?;
        let sql = format!("{} WHERE s.team_id = ? ORDER BY s.id", STOCK_SELECT);
        sqlx::query(&sql)
            .bind(team_id)
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?
            .iter()
            .map(decode_stock)
            .collect()
    }
}

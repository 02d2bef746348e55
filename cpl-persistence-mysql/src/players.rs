use cpl_domain::{
    ServiceError, ServiceResult,
    player::{Player, PlayerCreate, PlayerRepository, PlayerUpdate},
};
use sqlx::{MySql, Pool, Row, mysql::MySqlRow};

use crate::db_err;

pub struct MySqlPlayerRepository {
    pool: Pool<MySql>,
}

impl MySqlPlayerRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn player_from_row(row: &MySqlRow) -> ServiceResult<Player> {
        Ok(Player {
            id: row.try_get("Id").map_err(db_err)?,
            first_name: row.try_get("FirstName").map_err(db_err)?,
            last_name: row.try_get("LastName").map_err(db_err)?,
            date_of_birth: row.try_get("DateOfBirth").map_err(db_err)?,
            avatar_url: row.try_get("AvatarUrl").map_err(db_err)?,
            nationality_id: row.try_get("NationalityId").map_err(db_err)?,
        })
    }
}

#[async_trait::async_trait]
impl PlayerRepository for MySqlPlayerRepository {
    async fn get_by_id(&self, id: i64) -> ServiceResult<Option<Player>> {
        let row = sqlx::query(
            "SELECT Id, FirstName, LastName, DateOfBirth, AvatarUrl, NationalityId \
             FROM tblPlayers WHERE Id = ? AND Void = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| Self::player_from_row(&r)).transpose()
    }

    async fn get_all(&self) -> ServiceResult<Vec<Player>> {
        let rows = sqlx::query(
            "SELECT Id, FirstName, LastName, DateOfBirth, AvatarUrl, NationalityId \
             FROM tblPlayers WHERE Void = 0",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(Self::player_from_row).collect()
    }

    async fn create(&self, player: &PlayerCreate) -> ServiceResult<Player> {
        let result = sqlx::query(
            "INSERT INTO tblPlayers (FirstName, LastName, DateOfBirth, AvatarUrl, NationalityId) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&player.first_name)
        .bind(&player.last_name)
        .bind(player.date_of_birth)
        .bind(&player.avatar_url)
        .bind(player.nationality_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        match self.get_by_id(result.last_insert_id() as i64).await? {
            Some(created) => Ok(created),
            None => ServiceError::internal("Inserted player row not readable"),
        }
    }

    async fn update(&self, id: i64, update: &PlayerUpdate) -> ServiceResult<Option<Player>> {
        let mut sets = Vec::new();
        if update.first_name.is_some() {
            sets.push("FirstName = ?");
        }
        if update.last_name.is_some() {
            sets.push("LastName = ?");
        }
        if update.date_of_birth.is_some() {
            sets.push("DateOfBirth = ?");
        }
        if update.avatar_url.is_some() {
            sets.push("AvatarUrl = ?");
        }
        if update.nationality_id.is_some() {
            sets.push("NationalityId = ?");
        }
        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query_str = format!(
            "UPDATE tblPlayers SET {} WHERE Id = ? AND Void = 0",
            sets.join(", ")
        );
        let mut query = sqlx::query(&query_str);
        if let Some(first_name) = &update.first_name {
            query = query.bind(first_name);
        }
        if let Some(last_name) = &update.last_name {
            query = query.bind(last_name);
        }
        if let Some(date_of_birth) = update.date_of_birth {
            query = query.bind(date_of_birth);
        }
        if let Some(avatar_url) = &update.avatar_url {
            query = query.bind(avatar_url);
        }
        if let Some(nationality_id) = update.nationality_id {
            query = query.bind(nationality_id);
        }
        query = query.bind(id);
        query.execute(&self.pool).await.map_err(db_err)?;

        self.get_by_id(id).await
    }

    async fn soft_delete(&self, id: i64) -> ServiceResult<bool> {
        let result = sqlx::query("UPDATE tblPlayers SET Void = 1 WHERE Id = ? AND Void = 0")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

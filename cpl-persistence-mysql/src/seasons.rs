use cpl_domain::{
    ServiceError, ServiceResult,
    season::{Season, SeasonCreate, SeasonRepository, SeasonStatus, SeasonUpdate},
};
use sqlx::{MySql, Pool, Row, mysql::MySqlRow};

use crate::db_err;

pub struct MySqlSeasonRepository {
    pool: Pool<MySql>,
}

impl MySqlSeasonRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn season_from_row(row: &MySqlRow) -> ServiceResult<Season> {
        let status: i32 = row.try_get("Status").map_err(db_err)?;
        Ok(Season {
            id: row.try_get("Id").map_err(db_err)?,
            name: row.try_get("Name").map_err(db_err)?,
            start_date: row.try_get("StartDate").map_err(db_err)?,
            end_date: row.try_get("EndDate").map_err(db_err)?,
            logo_url: row.try_get("LogoUrl").map_err(db_err)?,
            status: SeasonStatus::from_i32(status)
                .ok_or_else(|| ServiceError::Internal(format!("invalid season status {}", status)))?,
        })
    }
}

#[async_trait::async_trait]
impl SeasonRepository for MySqlSeasonRepository {
    async fn get_by_id(&self, id: i64) -> ServiceResult<Option<Season>> {
        let row = sqlx::query(
            "SELECT Id, Name, StartDate, EndDate, LogoUrl, Status \
             FROM tblSeasons WHERE Id = ? AND Void = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| Self::season_from_row(&r)).transpose()
    }

    async fn get_all(&self) -> ServiceResult<Vec<Season>> {
        let rows = sqlx::query(
            "SELECT Id, Name, StartDate, EndDate, LogoUrl, Status \
             FROM tblSeasons WHERE Void = 0 ORDER BY Id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(Self::season_from_row).collect()
    }

    async fn create(&self, season: &SeasonCreate) -> ServiceResult<Season> {
        let result = sqlx::query(
            "INSERT INTO tblSeasons (Name, StartDate, EndDate, LogoUrl) VALUES (?, ?, ?, ?)",
        )
        .bind(&season.name)
        .bind(season.start_date)
        .bind(season.end_date)
        .bind(&season.logo_url)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        match self.get_by_id(result.last_insert_id() as i64).await? {
            Some(created) => Ok(created),
            None => ServiceError::internal("Inserted season row not readable"),
        }
    }

    async fn update(&self, id: i64, update: &SeasonUpdate) -> ServiceResult<Option<Season>> {
        let mut sets = Vec::new();
        if update.name.is_some() {
            sets.push("Name = ?");
        }
        if update.start_date.is_some() {
            sets.push("StartDate = ?");
        }
        if update.end_date.is_some() {
            sets.push("EndDate = ?");
        }
        if update.logo_url.is_some() {
            sets.push("LogoUrl = ?");
        }
        if update.status.is_some() {
            sets.push("Status = ?");
        }
        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query_str = format!(
            "UPDATE tblSeasons SET {} WHERE Id = ? AND Void = 0",
            sets.join(", ")
        );
        let mut query = sqlx::query(&query_str);
        if let Some(name) = &update.name {
            query = query.bind(name);
        }
        if let Some(start_date) = update.start_date {
            query = query.bind(start_date);
        }
        if let Some(end_date) = update.end_date {
            query = query.bind(end_date);
        }
        if let Some(logo_url) = &update.logo_url {
            query = query.bind(logo_url);
        }
        if let Some(status) = update.status {
            query = query.bind(status.as_i32());
        }
        query = query.bind(id);
        query.execute(&self.pool).await.map_err(db_err)?;

        self.get_by_id(id).await
    }

    async fn soft_delete(&self, id: i64) -> ServiceResult<bool> {
        let result = sqlx::query("UPDATE tblSeasons SET Void = 1 WHERE Id = ? AND Void = 0")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_name(&self, name: &str) -> ServiceResult<bool> {
        let row = sqlx::query("SELECT 1 FROM tblSeasons WHERE Name = ? AND Void = 0 LIMIT 1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.is_some())
    }
}

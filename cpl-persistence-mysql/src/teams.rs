use cpl_domain::{
    ServiceError, ServiceResult,
    team::{Team, TeamCreate, TeamRepository, TeamUpdate},
};
use sqlx::{MySql, Pool, Row, mysql::MySqlRow};

use crate::db_err;

pub struct MySqlTeamRepository {
    pool: Pool<MySql>,
}

impl MySqlTeamRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn team_from_row(row: &MySqlRow) -> ServiceResult<Team> {
        Ok(Team {
            id: row.try_get("Id").map_err(db_err)?,
            name: row.try_get("Name").map_err(db_err)?,
            slogan: row.try_get("Slogan").map_err(db_err)?,
            logo_url: row.try_get("LogoUrl").map_err(db_err)?,
        })
    }
}

#[async_trait::async_trait]
impl TeamRepository for MySqlTeamRepository {
    async fn get_by_id(&self, id: i64) -> ServiceResult<Option<Team>> {
        let row = sqlx::query(
            "SELECT Id, Name, Slogan, LogoUrl FROM tblTeams WHERE Id = ? AND Void = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| Self::team_from_row(&r)).transpose()
    }

    async fn get_all(&self) -> ServiceResult<Vec<Team>> {
        let rows = sqlx::query("SELECT Id, Name, Slogan, LogoUrl FROM tblTeams WHERE Void = 0")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(Self::team_from_row).collect()
    }

    async fn create(&self, team: &TeamCreate) -> ServiceResult<Team> {
        let result = sqlx::query("INSERT INTO tblTeams (Name, Slogan, LogoUrl) VALUES (?, ?, ?)")
            .bind(&team.name)
            .bind(&team.slogan)
            .bind(&team.logo_url)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        match self.get_by_id(result.last_insert_id() as i64).await? {
            Some(created) => Ok(created),
            None => ServiceError::internal("Inserted team row not readable"),
        }
    }

    async fn update(&self, id: i64, update: &TeamUpdate) -> ServiceResult<Option<Team>> {
        let mut sets = Vec::new();
        if update.name.is_some() {
            sets.push("Name = ?");
        }
        if update.slogan.is_some() {
            sets.push("Slogan = ?");
        }
        if update.logo_url.is_some() {
            sets.push("LogoUrl = ?");
        }
        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query_str = format!(
            "UPDATE tblTeams SET {} WHERE Id = ? AND Void = 0",
            sets.join(", ")
        );
        let mut query = sqlx::query(&query_str);
        for value in [&update.name, &update.slogan, &update.logo_url]
            .into_iter()
            .flatten()
        {
            query = query.bind(value);
        }
        query = query.bind(id);
        query.execute(&self.pool).await.map_err(db_err)?;

        self.get_by_id(id).await
    }

    async fn soft_delete(&self, id: i64) -> ServiceResult<bool> {
        let result = sqlx::query("UPDATE tblTeams SET Void = 1 WHERE Id = ? AND Void = 0")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

use cpl_domain::{
    ServiceError, ServiceResult,
    roster::{
        PlayerSeasonHistoryItem, Roster, RosterRepository, SeasonRosterEntry, TeamRosterPlayer,
    },
};
use sqlx::{MySql, Pool, Row};

use crate::db_err;

pub struct MySqlRosterRepository {
    pool: Pool<MySql>,
}

impl MySqlRosterRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RosterRepository for MySqlRosterRepository {
    async fn assign_player(
        &self,
        season_id: i64,
        team_id: i64,
        player_id: i64,
    ) -> ServiceResult<()> {
        // The routine signals an exclusivity violation as a database error;
        // that is the caller's conflict, not an internal failure.
        sqlx::query("CALL usp_AssignPlayerToTeam(?, ?, ?)")
            .bind(season_id)
            .bind(team_id)
            .bind(player_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) => ServiceError::Conflict(db.message().to_string()),
                e => ServiceError::Internal(e.to_string()),
            })?;
        Ok(())
    }

    async fn get_by_player_season(
        &self,
        player_id: i64,
        season_id: i64,
    ) -> ServiceResult<Option<Roster>> {
        let row = sqlx::query(
            "SELECT Id, PlayerId, SeasonId, TeamId \
             FROM tblPlayersSeasonsTeams \
             WHERE PlayerId = ? AND SeasonId = ? AND Void = 0",
        )
        .bind(player_id)
        .bind(season_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|r| {
            Ok(Roster {
                id: r.try_get("Id").map_err(db_err)?,
                player_id: r.try_get("PlayerId").map_err(db_err)?,
                season_id: r.try_get("SeasonId").map_err(db_err)?,
                team_id: r.try_get("TeamId").map_err(db_err)?,
            })
        })
        .transpose()
    }

    async fn remove_player(&self, season_id: i64, player_id: i64) -> ServiceResult<bool> {
        let result = sqlx::query(
            "UPDATE tblPlayersSeasonsTeams SET Void = 1 \
             WHERE SeasonId = ? AND PlayerId = ? AND Void = 0",
        )
        .bind(season_id)
        .bind(player_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_team_roster(
        &self,
        season_id: i64,
        team_id: i64,
    ) -> ServiceResult<Vec<TeamRosterPlayer>> {
        let rows = sqlx::query(
            "SELECT p.Id AS PlayerId, p.FirstName, p.LastName, p.AvatarUrl \
             FROM tblPlayersSeasonsTeams pst \
             JOIN tblPlayers p ON pst.PlayerId = p.Id \
             WHERE pst.SeasonId = ? AND pst.TeamId = ? AND pst.Void = 0 AND p.Void = 0",
        )
        .bind(season_id)
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|r| {
                Ok(TeamRosterPlayer {
                    player_id: r.try_get("PlayerId").map_err(db_err)?,
                    first_name: r.try_get("FirstName").map_err(db_err)?,
                    last_name: r.try_get("LastName").map_err(db_err)?,
                    avatar_url: r.try_get("AvatarUrl").map_err(db_err)?,
                })
            })
            .collect()
    }

    async fn get_player_history(
        &self,
        player_id: i64,
    ) -> ServiceResult<Vec<PlayerSeasonHistoryItem>> {
        let rows = sqlx::query(
            "SELECT s.Id AS SeasonId, s.Name AS SeasonName, t.Id AS TeamId, t.Name AS TeamName \
             FROM tblPlayersSeasonsTeams pst \
             JOIN tblSeasons s ON pst.SeasonId = s.Id \
             JOIN tblTeams t ON pst.TeamId = t.Id \
             WHERE pst.PlayerId = ? AND pst.Void = 0 \
             ORDER BY s.Id DESC",
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|r| {
                Ok(PlayerSeasonHistoryItem {
                    season_id: r.try_get("SeasonId").map_err(db_err)?,
                    season_name: r.try_get("SeasonName").map_err(db_err)?,
                    team_id: r.try_get("TeamId").map_err(db_err)?,
                    team_name: r.try_get("TeamName").map_err(db_err)?,
                })
            })
            .collect()
    }

    async fn get_season_rosters(&self, season_id: i64) -> ServiceResult<Vec<SeasonRosterEntry>> {
        let rows = sqlx::query(
            "SELECT t.Id AS TeamId, t.Name AS TeamName, \
                    p.Id AS PlayerId, p.FirstName, p.LastName \
             FROM tblPlayersSeasonsTeams pst \
             JOIN tblTeams t ON pst.TeamId = t.Id \
             JOIN tblPlayers p ON pst.PlayerId = p.Id \
             WHERE pst.SeasonId = ? AND pst.Void = 0",
        )
        .bind(season_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|r| {
                Ok(SeasonRosterEntry {
                    team_id: r.try_get("TeamId").map_err(db_err)?,
                    team_name: r.try_get("TeamName").map_err(db_err)?,
                    player_id: r.try_get("PlayerId").map_err(db_err)?,
                    first_name: r.try_get("FirstName").map_err(db_err)?,
                    last_name: r.try_get("LastName").map_err(db_err)?,
                })
            })
            .collect()
    }
}

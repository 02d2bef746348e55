use cpl_domain::{
    ServiceError, ServiceResult,
    league_table::{RawStandings, StandingRow, StandingsSource},
    season::SeasonStatus,
};
use sqlx::{MySql, Pool, Row, mysql::MySqlRow};

use crate::db_err;

/// Ranked-standings aggregate backed by the `usp_GetLeagueTable` routine. The
/// routine owns ranking and tie-breaking; rows come back already ordered.
pub struct MySqlStandingsSource {
    pool: Pool<MySql>,
}

impl MySqlStandingsSource {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn standing_from_row(row: &MySqlRow) -> ServiceResult<StandingRow> {
        let is_winner: i64 = row.try_get("IsWinner").map_err(db_err)?;
        Ok(StandingRow {
            team_id: row.try_get("TeamId").map_err(db_err)?,
            team_name: row.try_get("TeamName").map_err(db_err)?,
            matches_played: row.try_get("MatchesPlayed").map_err(db_err)?,
            wins: row.try_get("Wins").map_err(db_err)?,
            points: row.try_get("Points").map_err(db_err)?,
            net_points: row.try_get("NetPoints").map_err(db_err)?,
            head_to_head_wins: row.try_get("HeadToHeadWins").map_err(db_err)?,
            is_winner: is_winner != 0,
        })
    }
}

#[async_trait::async_trait]
impl StandingsSource for MySqlStandingsSource {
    async fn fetch_standings(&self, season_id: i64) -> ServiceResult<RawStandings> {
        let status: Option<i32> =
            sqlx::query_scalar("SELECT Status FROM tblSeasons WHERE Id = ? AND Void = 0")
                .bind(season_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        let Some(status) = status else {
            return ServiceError::not_found("Season not found");
        };
        let season_status = SeasonStatus::from_i32(status)
            .ok_or_else(|| ServiceError::Internal(format!("invalid season status {}", status)))?;

        let rows = sqlx::query("CALL usp_GetLeagueTable(?)")
            .bind(season_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(RawStandings {
            rows: rows
                .iter()
                .map(Self::standing_from_row)
                .collect::<ServiceResult<Vec<StandingRow>>>()?,
            season_status,
        })
    }
}

use cpl_domain::{
    ServiceResult,
    stats::{HeadToHead, HeadToHeadSource},
};
use sqlx::{MySql, Pool, Row, mysql::MySqlRow};

use crate::db_err;

/// Lifetime pairwise aggregate backed by `usp_GetLifetimeHeadToHead`.
pub struct MySqlHeadToHeadSource {
    pool: Pool<MySql>,
}

impl MySqlHeadToHeadSource {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn head_to_head_from_row(row: &MySqlRow) -> ServiceResult<HeadToHead> {
        Ok(HeadToHead {
            team1_id: row.try_get("TeamAId").map_err(db_err)?,
            team2_id: row.try_get("TeamBId").map_err(db_err)?,
            matches_played: row.try_get("TotalMatches").map_err(db_err)?,
            team1_wins: row.try_get("TeamAWins").map_err(db_err)?,
            team2_wins: row.try_get("TeamBWins").map_err(db_err)?,
            team1_net_points: row.try_get("TeamANetPoints").map_err(db_err)?,
            team2_net_points: row.try_get("TeamBNetPoints").map_err(db_err)?,
        })
    }
}

#[async_trait::async_trait]
impl HeadToHeadSource for MySqlHeadToHeadSource {
    async fn lifetime_head_to_head(
        &self,
        team1_id: i64,
        team2_id: i64,
    ) -> ServiceResult<Option<HeadToHead>> {
        let row = sqlx::query("CALL usp_GetLifetimeHeadToHead(?, ?)")
            .bind(team1_id)
            .bind(team2_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|r| Self::head_to_head_from_row(&r)).transpose()
    }
}

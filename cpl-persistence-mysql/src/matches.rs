use cpl_domain::{
    ServiceError, ServiceResult,
    matches::{
        LeagueCompletion, Match, MatchCategory, MatchCreate, MatchOutcome, MatchRepository,
        MatchStat, MatchStatEntry, MatchStatus, MatchUpdate, TossOutcome,
    },
};
use sqlx::{MySql, Pool, Row, mysql::MySqlRow};

use crate::db_err;

pub struct MySqlMatchRepository {
    pool: Pool<MySql>,
}

impl MySqlMatchRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn match_from_row(row: &MySqlRow) -> ServiceResult<Match> {
        let category: i32 = row.try_get("Category").map_err(db_err)?;
        let status: i32 = row.try_get("Status").map_err(db_err)?;
        let outcome: Option<i32> = row.try_get("Outcome").map_err(db_err)?;
        let toss_outcome: Option<i32> = row.try_get("TossOutcome").map_err(db_err)?;

        Ok(Match {
            id: row.try_get("Id").map_err(db_err)?,
            team1: row.try_get("Team1").map_err(db_err)?,
            team2: row.try_get("Team2").map_err(db_err)?,
            scheduled_date: row.try_get("ScheduledDate").map_err(db_err)?,
            duration: row.try_get("Duration").map_err(db_err)?,
            extra: row.try_get("Extra").map_err(db_err)?,
            golden_strike: row.try_get("GoldenStrike").map_err(db_err)?,
            category: MatchCategory::from_i32(category).ok_or_else(|| {
                ServiceError::Internal(format!("invalid match category {}", category))
            })?,
            status: MatchStatus::from_i32(status)
                .ok_or_else(|| ServiceError::Internal(format!("invalid match status {}", status)))?,
            season_id: row.try_get("SeasonId").map_err(db_err)?,
            order: row.try_get("Order").map_err(db_err)?,
            net_points: row.try_get("NetPoints").map_err(db_err)?,
            outcome: outcome
                .map(|v| {
                    MatchOutcome::from_i32(v).ok_or_else(|| {
                        ServiceError::Internal(format!("invalid match outcome {}", v))
                    })
                })
                .transpose()?,
            toss_outcome: toss_outcome
                .map(|v| {
                    TossOutcome::from_i32(v).ok_or_else(|| {
                        ServiceError::Internal(format!("invalid toss outcome {}", v))
                    })
                })
                .transpose()?,
        })
    }

    fn stat_from_row(row: &MySqlRow) -> ServiceResult<MatchStat> {
        Ok(MatchStat {
            match_id: row.try_get("MatchId").map_err(db_err)?,
            player_id: row.try_get("PlayerId").map_err(db_err)?,
            coins_pocketed: row.try_get("CoinsPocketed").map_err(db_err)?,
            strikers_pocketed: row.try_get("StrikersPocketed").map_err(db_err)?,
            coins_fined: row.try_get("CoinsFined").map_err(db_err)?,
            shots_taken: row.try_get("ShotsTaken").map_err(db_err)?,
        })
    }
}

#[async_trait::async_trait]
impl MatchRepository for MySqlMatchRepository {
    async fn create(&self, request: &MatchCreate) -> ServiceResult<Match> {
        let result = sqlx::query(
            "INSERT INTO tblMatches \
             (Team1, Team2, ScheduledDate, Duration, Extra, GoldenStrike, Category, Status, \
              `Order`, SeasonId, NetPoints, Outcome) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(request.team1)
        .bind(request.team2)
        .bind(request.scheduled_date)
        .bind(request.duration)
        .bind(request.extra)
        .bind(request.golden_strike)
        .bind(request.category.as_i32())
        .bind(request.status.as_i32())
        .bind(request.order)
        .bind(request.season_id)
        .bind(request.net_points)
        .bind(request.outcome.map(|o| o.as_i32()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        match self.get_by_id(result.last_insert_id() as i64).await? {
            Some(created) => Ok(created),
            None => ServiceError::internal("Inserted match row not readable"),
        }
    }

    async fn get_by_id(&self, id: i64) -> ServiceResult<Option<Match>> {
        let row = sqlx::query("SELECT * FROM tblMatches WHERE Id = ? AND Void = 0")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|r| Self::match_from_row(&r)).transpose()
    }

    async fn get_all(&self, season_id: Option<i64>) -> ServiceResult<Vec<Match>> {
        let rows = match season_id {
            Some(season_id) => {
                sqlx::query(
                    "SELECT * FROM tblMatches WHERE Void = 0 AND SeasonId = ? \
                     ORDER BY `Order` ASC",
                )
                .bind(season_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM tblMatches WHERE Void = 0 ORDER BY `Order` ASC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_err)?;
        rows.iter().map(Self::match_from_row).collect()
    }

    async fn update(&self, id: i64, update: &MatchUpdate) -> ServiceResult<Option<Match>> {
        let mut sets = Vec::new();
        if update.scheduled_date.is_some() {
            sets.push("ScheduledDate = ?");
        }
        if update.duration.is_some() {
            sets.push("Duration = ?");
        }
        if update.extra.is_some() {
            sets.push("Extra = ?");
        }
        if update.golden_strike.is_some() {
            sets.push("GoldenStrike = ?");
        }
        if update.status.is_some() {
            sets.push("Status = ?");
        }
        if update.net_points.is_some() {
            sets.push("NetPoints = ?");
        }
        if update.outcome.is_some() {
            sets.push("Outcome = ?");
        }
        if update.toss_outcome.is_some() {
            sets.push("TossOutcome = ?");
        }
        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        // Completed rows are frozen at the SQL level as well; the service
        // enforces the state machine before it gets here.
        let query_str = format!(
            "UPDATE tblMatches SET {} WHERE Id = ? AND Void = 0 AND Status <> {}",
            sets.join(", "),
            MatchStatus::Completed.as_i32()
        );
        let mut query = sqlx::query(&query_str);
        if let Some(scheduled_date) = update.scheduled_date {
            query = query.bind(scheduled_date);
        }
        if let Some(duration) = update.duration {
            query = query.bind(duration);
        }
        if let Some(extra) = update.extra {
            query = query.bind(extra);
        }
        if let Some(golden_strike) = update.golden_strike {
            query = query.bind(golden_strike);
        }
        if let Some(status) = update.status {
            query = query.bind(status.as_i32());
        }
        if let Some(net_points) = update.net_points {
            query = query.bind(net_points);
        }
        if let Some(outcome) = update.outcome {
            query = query.bind(outcome.as_i32());
        }
        if let Some(toss_outcome) = update.toss_outcome {
            query = query.bind(toss_outcome.as_i32());
        }
        query = query.bind(id);
        query.execute(&self.pool).await.map_err(db_err)?;

        self.get_by_id(id).await
    }

    async fn soft_delete(&self, id: i64) -> ServiceResult<bool> {
        let result = sqlx::query("UPDATE tblMatches SET Void = 1 WHERE Id = ? AND Void = 0")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn next_order(&self, season_id: i64) -> ServiceResult<Option<i32>> {
        let order: Option<i64> = sqlx::query_scalar(
            "SELECT t.DesiredOrder FROM ( \
                SELECT COALESCE(MAX(tm.`Order`), 0) + 1 AS DesiredOrder \
                FROM tblMatches tm \
                WHERE tm.SeasonId = ? AND tm.Void = 0 \
             ) t \
             WHERE EXISTS ( \
                SELECT 1 FROM tblSeasons ts \
                WHERE ts.Id = ? AND ts.Void = 0 AND ts.Status <> 3 \
             )",
        )
        .bind(season_id)
        .bind(season_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(order.map(|o| o as i32))
    }

    async fn has_final(&self, season_id: i64) -> ServiceResult<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM tblMatches \
             WHERE SeasonId = ? AND Void = 0 AND Category = ? LIMIT 1",
        )
        .bind(season_id)
        .bind(MatchCategory::Final.as_i32())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.is_some())
    }

    async fn league_completion(&self, season_id: i64) -> ServiceResult<LeagueCompletion> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS TotalLeagueMatches, \
                    COUNT(CASE WHEN Status <> ? THEN 1 END) AS PendingLeagueMatches \
             FROM tblMatches \
             WHERE SeasonId = ? AND Category = ? AND Void = 0",
        )
        .bind(MatchStatus::Completed.as_i32())
        .bind(season_id)
        .bind(MatchCategory::League.as_i32())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(LeagueCompletion {
            total: row.try_get("TotalLeagueMatches").map_err(db_err)?,
            pending: row.try_get("PendingLeagueMatches").map_err(db_err)?,
        })
    }

    async fn assign_final_teams(
        &self,
        season_id: i64,
        team1: i64,
        team2: i64,
    ) -> ServiceResult<bool> {
        // Single conditional statement: at most the one outstanding final row
        // is touched, so concurrent triggers cannot assign different pairs.
        let result = sqlx::query(
            "UPDATE tblMatches \
             SET Team1 = ?, Team2 = ?, UpdatedAt = CURRENT_TIMESTAMP(6) \
             WHERE SeasonId = ? AND Category = ? AND Void = 0 AND Status <> ? \
             ORDER BY `Order` ASC LIMIT 1",
        )
        .bind(team1)
        .bind(team2)
        .bind(season_id)
        .bind(MatchCategory::Final.as_i32())
        .bind(MatchStatus::Completed.as_i32())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn upsert_stats(&self, match_id: i64, entries: &[MatchStatEntry]) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for entry in entries {
            sqlx::query(
                "INSERT INTO tblMatchStats \
                 (MatchId, PlayerId, CoinsPocketed, StrikersPocketed, CoinsFined, ShotsTaken) \
                 VALUES (?, ?, ?, ?, ?, ?) \
                 ON DUPLICATE KEY UPDATE \
                    CoinsPocketed = VALUES(CoinsPocketed), \
                    StrikersPocketed = VALUES(StrikersPocketed), \
                    CoinsFined = VALUES(CoinsFined), \
                    ShotsTaken = VALUES(ShotsTaken), \
                    Void = 0, \
                    UpdatedAt = CURRENT_TIMESTAMP(6)",
            )
            .bind(match_id)
            .bind(entry.player_id)
            .bind(entry.coins_pocketed)
            .bind(entry.strikers_pocketed)
            .bind(entry.coins_fined)
            .bind(entry.shots_taken)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)
    }

    async fn get_stats(&self, match_id: i64) -> ServiceResult<Vec<MatchStat>> {
        let rows = sqlx::query(
            "SELECT MatchId, PlayerId, CoinsPocketed, StrikersPocketed, CoinsFined, ShotsTaken \
             FROM tblMatchStats \
             WHERE MatchId = ? AND Void = 0 \
             ORDER BY PlayerId ASC",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(Self::stat_from_row).collect()
    }
}

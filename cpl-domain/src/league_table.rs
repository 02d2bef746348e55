use std::sync::Arc;

use serde::Serialize;

use crate::{
    ServiceResult,
    season::{SeasonId, SeasonStatus},
    team::TeamId,
};

/// One ranked row as produced by the aggregate source. Row order is the
/// ranking; this layer never re-sorts.
#[derive(Clone, Debug, PartialEq)]
pub struct StandingRow {
    pub team_id: TeamId,
    pub team_name: String,
    pub matches_played: i64,
    pub wins: i64,
    pub points: i64,
    pub net_points: i64,
    pub head_to_head_wins: i64,
    pub is_winner: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawStandings {
    pub rows: Vec<StandingRow>,
    pub season_status: SeasonStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeagueTableStanding {
    pub team_id: TeamId,
    pub team_name: String,
    pub matches_played: i64,
    pub wins: i64,
    pub points: i64,
    pub net_points: i64,
    pub head_to_head_wins: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeagueTable {
    pub winner_id: Option<TeamId>,
    pub season_status: SeasonStatus,
    pub standings: Vec<LeagueTableStanding>,
}

pub type ArcStandingsSource = Arc<Box<dyn StandingsSource + Send + Sync + 'static>>;

/// Opaque ranked-standings aggregate; the database routine behind it is the
/// ranking authority.
#[async_trait::async_trait]
pub trait StandingsSource {
    async fn fetch_standings(&self, season_id: SeasonId) -> ServiceResult<RawStandings>;
}

/// When several rows carry the winner flag, the last one wins. The upstream
/// aggregate is only expected to flag one row; the behavior for multiples is
/// preserved from the data source, not corrected here.
pub fn compute_league_table(raw: RawStandings) -> LeagueTable {
    let mut winner_id = None;
    let standings = raw
        .rows
        .into_iter()
        .map(|row| {
            if row.is_winner {
                winner_id = Some(row.team_id);
            }
            LeagueTableStanding {
                team_id: row.team_id,
                team_name: row.team_name,
                matches_played: row.matches_played,
                wins: row.wins,
                points: row.points,
                net_points: row.net_points,
                head_to_head_wins: row.head_to_head_wins,
            }
        })
        .collect();

    LeagueTable {
        winner_id,
        season_status: raw.season_status,
        standings,
    }
}

#[derive(Default, Clone)]
pub struct MockStandingsSource {
    pub rows: Vec<StandingRow>,
    pub season_status: SeasonStatus,
}

#[async_trait::async_trait]
impl StandingsSource for MockStandingsSource {
    async fn fetch_standings(&self, _season_id: SeasonId) -> ServiceResult<RawStandings> {
        Ok(RawStandings {
            rows: self.rows.clone(),
            season_status: self.season_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(team_id: TeamId, wins: i64, is_winner: bool) -> StandingRow {
        StandingRow {
            team_id,
            team_name: format!("Team {}", team_id),
            matches_played: 2,
            wins,
            points: wins * 2,
            net_points: wins * 3 - 2,
            head_to_head_wins: 0,
            is_winner,
        }
    }

    #[test]
    fn test_empty_rows_yield_empty_table() {
        let table = compute_league_table(RawStandings {
            rows: vec![],
            season_status: SeasonStatus::InProgress,
        });
        assert!(table.standings.is_empty());
        assert_eq!(table.winner_id, None);
        assert_eq!(table.season_status, SeasonStatus::InProgress);
    }

    #[test]
    fn test_row_order_is_preserved() {
        let table = compute_league_table(RawStandings {
            rows: vec![row(3, 2, false), row(1, 1, false), row(2, 0, false)],
            season_status: SeasonStatus::InProgress,
        });
        let ids: Vec<TeamId> = table.standings.iter().map(|s| s.team_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(table.winner_id, None);
    }

    #[test]
    fn test_winner_flag_is_copied() {
        let table = compute_league_table(RawStandings {
            rows: vec![row(3, 2, true), row(1, 1, false)],
            season_status: SeasonStatus::Completed,
        });
        assert_eq!(table.winner_id, Some(3));
    }

    #[test]
    fn test_last_flagged_row_wins_on_multiple_winners() {
        let table = compute_league_table(RawStandings {
            rows: vec![row(3, 2, true), row(1, 2, true), row(2, 0, false)],
            season_status: SeasonStatus::Completed,
        });
        assert_eq!(table.winner_id, Some(1));
    }
}

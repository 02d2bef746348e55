use std::{collections::HashSet, sync::Arc};

use chrono::NaiveDate;
use dashmap::DashMap;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    ServiceError, ServiceResult,
    league_table::ArcStandingsSource,
    player::PlayerId,
    season::SeasonId,
    team::TeamId,
};

pub type MatchId = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchCategory {
    League,
    Final,
}

impl MatchCategory {
    pub fn as_i32(self) -> i32 {
        match self {
            MatchCategory::League => 1,
            MatchCategory::Final => 2,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(MatchCategory::League),
            2 => Some(MatchCategory::Final),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl MatchStatus {
    pub fn as_i32(self) -> i32 {
        match self {
            MatchStatus::NotStarted => 1,
            MatchStatus::InProgress => 2,
            MatchStatus::Completed => 3,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(MatchStatus::NotStarted),
            2 => Some(MatchStatus::InProgress),
            3 => Some(MatchStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Team1Won,
    Team2Won,
}

impl MatchOutcome {
    pub fn as_i32(self) -> i32 {
        match self {
            MatchOutcome::Team1Won => 1,
            MatchOutcome::Team2Won => 2,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(MatchOutcome::Team1Won),
            2 => Some(MatchOutcome::Team2Won),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TossOutcome {
    Team1,
    Team2,
}

impl TossOutcome {
    pub fn as_i32(self) -> i32 {
        match self {
            TossOutcome::Team1 => 1,
            TossOutcome::Team2 => 2,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(TossOutcome::Team1),
            2 => Some(TossOutcome::Team2),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Match {
    pub id: MatchId,
    pub team1: Option<TeamId>,
    pub team2: Option<TeamId>,
    pub scheduled_date: NaiveDate,
    pub duration: Option<i32>,
    pub extra: Option<i32>,
    pub golden_strike: bool,
    pub category: MatchCategory,
    pub status: MatchStatus,
    pub season_id: SeasonId,
    pub order: i32,
    pub net_points: Option<i32>,
    pub outcome: Option<MatchOutcome>,
    pub toss_outcome: Option<TossOutcome>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MatchCreate {
    pub team1: Option<TeamId>,
    pub team2: Option<TeamId>,
    pub scheduled_date: NaiveDate,
    pub duration: Option<i32>,
    pub extra: Option<i32>,
    pub golden_strike: bool,
    pub category: MatchCategory,
    pub status: MatchStatus,
    pub order: Option<i32>,
    pub season_id: SeasonId,
    pub net_points: Option<i32>,
    pub outcome: Option<MatchOutcome>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MatchUpdate {
    pub scheduled_date: Option<NaiveDate>,
    pub duration: Option<i32>,
    pub extra: Option<i32>,
    pub golden_strike: Option<bool>,
    pub status: Option<MatchStatus>,
    pub net_points: Option<i32>,
    pub outcome: Option<MatchOutcome>,
    pub toss_outcome: Option<TossOutcome>,
}

impl MatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.scheduled_date.is_none()
            && self.duration.is_none()
            && self.extra.is_none()
            && self.golden_strike.is_none()
            && self.status.is_none()
            && self.net_points.is_none()
            && self.outcome.is_none()
            && self.toss_outcome.is_none()
    }

    /// An update that carries `status: Completed` and nothing else. On an
    /// already-completed league match this re-fires the final sync instead of
    /// being rejected, so a lost assignment can be retried.
    pub fn is_status_retouch(&self) -> bool {
        matches!(self.status, Some(MatchStatus::Completed))
            && self.scheduled_date.is_none()
            && self.duration.is_none()
            && self.extra.is_none()
            && self.golden_strike.is_none()
            && self.net_points.is_none()
            && self.outcome.is_none()
            && self.toss_outcome.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeagueCompletion {
    pub total: i64,
    pub pending: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MatchStat {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub coins_pocketed: u8,
    pub strikers_pocketed: u8,
    pub coins_fined: u8,
    pub shots_taken: u8,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct MatchStatEntry {
    pub player_id: PlayerId,
    pub coins_pocketed: u8,
    pub strikers_pocketed: u8,
    pub coins_fined: u8,
    pub shots_taken: u8,
}

pub type ArcMatchRepository = Arc<Box<dyn MatchRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait MatchRepository {
    async fn create(&self, request: &MatchCreate) -> ServiceResult<Match>;
    async fn get_by_id(&self, id: MatchId) -> ServiceResult<Option<Match>>;
    async fn get_all(&self, season_id: Option<SeasonId>) -> ServiceResult<Vec<Match>>;
    async fn update(&self, id: MatchId, update: &MatchUpdate) -> ServiceResult<Option<Match>>;
    async fn soft_delete(&self, id: MatchId) -> ServiceResult<bool>;
    /// Next free schedule slot: max non-voided order in the season plus one.
    /// `None` when the season is missing, voided, or already completed.
    async fn next_order(&self, season_id: SeasonId) -> ServiceResult<Option<i32>>;
    async fn has_final(&self, season_id: SeasonId) -> ServiceResult<bool>;
    async fn league_completion(&self, season_id: SeasonId) -> ServiceResult<LeagueCompletion>;
    /// Fills the one outstanding final slot of the season: a single
    /// conditional update of the first non-voided, not-yet-completed final
    /// match by order. Returns whether a row was written.
    async fn assign_final_teams(
        &self,
        season_id: SeasonId,
        team1: TeamId,
        team2: TeamId,
    ) -> ServiceResult<bool>;
    async fn upsert_stats(
        &self,
        match_id: MatchId,
        entries: &[MatchStatEntry],
    ) -> ServiceResult<()>;
    async fn get_stats(&self, match_id: MatchId) -> ServiceResult<Vec<MatchStat>>;
}

pub type ArcMatchService = Arc<Box<dyn MatchService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait MatchService {
    async fn create_match(&self, request: MatchCreate) -> ServiceResult<Match>;
    async fn get_match(&self, id: MatchId) -> ServiceResult<Match>;
    async fn get_matches(&self, season_id: Option<SeasonId>) -> ServiceResult<Vec<Match>>;
    async fn update_match(&self, id: MatchId, update: MatchUpdate) -> ServiceResult<Match>;
    async fn delete_match(&self, id: MatchId) -> ServiceResult<()>;
    async fn next_match_order(&self, season_id: SeasonId) -> ServiceResult<i32>;
    async fn upsert_match_stats(
        &self,
        match_id: MatchId,
        entries: Vec<MatchStatEntry>,
    ) -> ServiceResult<Vec<MatchStat>>;
}

pub struct MatchServiceImpl {
    match_repository: ArcMatchRepository,
    standings_source: ArcStandingsSource,
    final_sync_locks: DashMap<SeasonId, Arc<tokio::sync::Mutex<()>>>,
}

impl MatchServiceImpl {
    pub fn new(match_repository: ArcMatchRepository, standings_source: ArcStandingsSource) -> Self {
        Self {
            match_repository,
            standings_source,
            final_sync_locks: DashMap::new(),
        }
    }

    fn validate_teams(request: &MatchCreate) -> ServiceResult<()> {
        match (request.team1, request.team2) {
            (Some(team1), Some(team2)) if team1 == team2 => {
                ServiceError::validation("Team1 and Team2 cannot be the same")
            }
            (None, None) if request.category != MatchCategory::Final => {
                ServiceError::validation("League matches require both teams")
            }
            (None, Some(_)) | (Some(_), None) => {
                ServiceError::validation("Both teams must be provided together")
            }
            _ => Ok(()),
        }
    }

    fn season_lock(&self, season_id: SeasonId) -> Arc<tokio::sync::Mutex<()>> {
        self.final_sync_locks
            .entry(season_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Back-fills the reserved final match once the league stage is done.
    /// The two "league not finished" and "fewer than two qualified teams"
    /// outcomes are expected steady states, not errors. Serialized per season
    /// so concurrent league-match completions cannot interleave the
    /// completion check with the standings read.
    async fn sync_final_match_teams(&self, season_id: SeasonId) -> ServiceResult<()> {
        let lock = self.season_lock(season_id);
        let _guard = lock.lock().await;

        let completion = self.match_repository.league_completion(season_id).await?;
        if completion.total == 0 || completion.pending > 0 {
            return Ok(());
        }

        let raw = self.standings_source.fetch_standings(season_id).await?;
        let mut ranked = raw
            .rows
            .iter()
            .filter(|row| row.matches_played > 0)
            .map(|row| row.team_id);
        let (Some(team1), Some(team2)) = (ranked.next(), ranked.next()) else {
            return Ok(());
        };
        if team1 == team2 {
            return Ok(());
        }

        let assigned = self
            .match_repository
            .assign_final_teams(season_id, team1, team2)
            .await?;
        if assigned {
            info!(
                "Season {}: final match teams set to {} vs {}",
                season_id, team1, team2
            );
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MatchService for MatchServiceImpl {
    async fn create_match(&self, request: MatchCreate) -> ServiceResult<Match> {
        Self::validate_teams(&request)?;

        if request.category == MatchCategory::Final
            && self.match_repository.has_final(request.season_id).await?
        {
            return ServiceError::conflict("Final match already exists for this season");
        }

        let order = match request.order {
            Some(order) => order,
            None => match self.match_repository.next_order(request.season_id).await? {
                Some(order) => order,
                None => {
                    return ServiceError::not_found("Season not found or already completed");
                }
            },
        };

        let mut request = request;
        request.order = Some(order);
        let created = self.match_repository.create(&request).await?;
        info!(
            "Match {} created in season {} (order {})",
            created.id, created.season_id, created.order
        );
        Ok(created)
    }

    async fn get_match(&self, id: MatchId) -> ServiceResult<Match> {
        match self.match_repository.get_by_id(id).await? {
            Some(m) => Ok(m),
            None => ServiceError::not_found("Match not found"),
        }
    }

    async fn get_matches(&self, season_id: Option<SeasonId>) -> ServiceResult<Vec<Match>> {
        self.match_repository.get_all(season_id).await
    }

    async fn update_match(&self, id: MatchId, update: MatchUpdate) -> ServiceResult<Match> {
        let Some(existing) = self.match_repository.get_by_id(id).await? else {
            return ServiceError::not_found("Match not found");
        };

        if existing.status == MatchStatus::Completed {
            if !update.is_status_retouch() {
                return ServiceError::validation("Match is already completed");
            }
            if existing.category == MatchCategory::League {
                self.sync_final_match_teams(existing.season_id).await?;
            }
            return Ok(existing);
        }

        if let Some(new_status) = update.status
            && new_status.as_i32() < existing.status.as_i32()
        {
            return ServiceError::validation("Illegal status transition");
        }

        if update.is_empty() {
            return Ok(existing);
        }

        let Some(updated) = self.match_repository.update(id, &update).await? else {
            return ServiceError::not_found("Match not found");
        };

        if updated.category == MatchCategory::League && updated.status == MatchStatus::Completed {
            self.sync_final_match_teams(updated.season_id).await?;
        }
        Ok(updated)
    }

    async fn delete_match(&self, id: MatchId) -> ServiceResult<()> {
        if !self.match_repository.soft_delete(id).await? {
            return ServiceError::not_found("Match not found");
        }
        Ok(())
    }

    async fn next_match_order(&self, season_id: SeasonId) -> ServiceResult<i32> {
        match self.match_repository.next_order(season_id).await? {
            Some(order) => Ok(order),
            None => ServiceError::not_found("Season not found or already completed"),
        }
    }

    async fn upsert_match_stats(
        &self,
        match_id: MatchId,
        entries: Vec<MatchStatEntry>,
    ) -> ServiceResult<Vec<MatchStat>> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.player_id) {
                return ServiceError::validation(format!(
                    "Duplicate player {} in stats payload",
                    entry.player_id
                ));
            }
        }

        if self.match_repository.get_by_id(match_id).await?.is_none() {
            return ServiceError::not_found("Match not found");
        }

        if !entries.is_empty() {
            self.match_repository
                .upsert_stats(match_id, &entries)
                .await?;
        }
        self.match_repository.get_stats(match_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::{
        league_table::{MockStandingsSource, RawStandings, StandingRow, StandingsSource},
        season::SeasonStatus,
    };

    use super::*;

    struct SeasonRow {
        id: SeasonId,
        status: SeasonStatus,
    }

    #[derive(Clone)]
    struct MatchRow {
        match_: Match,
        void: bool,
    }

    #[derive(Clone, Copy)]
    struct StatRow {
        stat: MatchStat,
        void: bool,
    }

    struct InMemoryMatchRepository {
        seasons: Vec<SeasonRow>,
        matches: Mutex<Vec<MatchRow>>,
        stats: Mutex<Vec<StatRow>>,
        next_id: Mutex<MatchId>,
    }

    impl InMemoryMatchRepository {
        fn new(seasons: Vec<SeasonRow>) -> Self {
            Self {
                seasons,
                matches: Mutex::new(vec![]),
                stats: Mutex::new(vec![]),
                next_id: Mutex::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl MatchRepository for InMemoryMatchRepository {
        async fn create(&self, request: &MatchCreate) -> ServiceResult<Match> {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let match_ = Match {
                id: *next_id,
                team1: request.team1,
                team2: request.team2,
                scheduled_date: request.scheduled_date,
                duration: request.duration,
                extra: request.extra,
                golden_strike: request.golden_strike,
                category: request.category,
                status: request.status,
                season_id: request.season_id,
                order: request.order.unwrap_or(0),
                net_points: request.net_points,
                outcome: request.outcome,
                toss_outcome: None,
            };
            self.matches.lock().unwrap().push(MatchRow {
                match_: match_.clone(),
                void: false,
            });
            Ok(match_)
        }

        async fn get_by_id(&self, id: MatchId) -> ServiceResult<Option<Match>> {
            Ok(self
                .matches
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.match_.id == id && !row.void)
                .map(|row| row.match_.clone()))
        }

        async fn get_all(&self, season_id: Option<SeasonId>) -> ServiceResult<Vec<Match>> {
            let mut matches: Vec<Match> = self
                .matches
                .lock()
                .unwrap()
                .iter()
                .filter(|row| !row.void)
                .filter(|row| season_id.is_none_or(|s| row.match_.season_id == s))
                .map(|row| row.match_.clone())
                .collect();
            matches.sort_by_key(|m| m.order);
            Ok(matches)
        }

        async fn update(&self, id: MatchId, update: &MatchUpdate) -> ServiceResult<Option<Match>> {
            let mut matches = self.matches.lock().unwrap();
            let Some(row) = matches
                .iter_mut()
                .find(|row| row.match_.id == id && !row.void)
            else {
                return Ok(None);
            };
            if let Some(scheduled_date) = update.scheduled_date {
                row.match_.scheduled_date = scheduled_date;
            }
            if let Some(duration) = update.duration {
                row.match_.duration = Some(duration);
            }
            if let Some(extra) = update.extra {
                row.match_.extra = Some(extra);
            }
            if let Some(golden_strike) = update.golden_strike {
                row.match_.golden_strike = golden_strike;
            }
            if let Some(status) = update.status {
                row.match_.status = status;
            }
            if let Some(net_points) = update.net_points {
                row.match_.net_points = Some(net_points);
            }
            if let Some(outcome) = update.outcome {
                row.match_.outcome = Some(outcome);
            }
            if let Some(toss_outcome) = update.toss_outcome {
                row.match_.toss_outcome = Some(toss_outcome);
            }
            Ok(Some(row.match_.clone()))
        }

        async fn soft_delete(&self, id: MatchId) -> ServiceResult<bool> {
            let mut matches = self.matches.lock().unwrap();
            let Some(row) = matches
                .iter_mut()
                .find(|row| row.match_.id == id && !row.void)
            else {
                return Ok(false);
            };
            row.void = true;
            Ok(true)
        }

        async fn next_order(&self, season_id: SeasonId) -> ServiceResult<Option<i32>> {
            let Some(season) = self.seasons.iter().find(|s| s.id == season_id) else {
                return Ok(None);
            };
            if season.status == SeasonStatus::Completed {
                return Ok(None);
            }
            let max_order = self
                .matches
                .lock()
                .unwrap()
                .iter()
                .filter(|row| !row.void && row.match_.season_id == season_id)
                .map(|row| row.match_.order)
                .max()
                .unwrap_or(0);
            Ok(Some(max_order + 1))
        }

        async fn has_final(&self, season_id: SeasonId) -> ServiceResult<bool> {
            Ok(self.matches.lock().unwrap().iter().any(|row| {
                !row.void
                    && row.match_.season_id == season_id
                    && row.match_.category == MatchCategory::Final
            }))
        }

        async fn league_completion(&self, season_id: SeasonId) -> ServiceResult<LeagueCompletion> {
            let matches = self.matches.lock().unwrap();
            let league: Vec<_> = matches
                .iter()
                .filter(|row| {
                    !row.void
                        && row.match_.season_id == season_id
                        && row.match_.category == MatchCategory::League
                })
                .collect();
            Ok(LeagueCompletion {
                total: league.len() as i64,
                pending: league
                    .iter()
                    .filter(|row| row.match_.status != MatchStatus::Completed)
                    .count() as i64,
            })
        }

        async fn assign_final_teams(
            &self,
            season_id: SeasonId,
            team1: TeamId,
            team2: TeamId,
        ) -> ServiceResult<bool> {
            let mut matches = self.matches.lock().unwrap();
            let mut finals: Vec<&mut MatchRow> = matches
                .iter_mut()
                .filter(|row| {
                    !row.void
                        && row.match_.season_id == season_id
                        && row.match_.category == MatchCategory::Final
                        && row.match_.status != MatchStatus::Completed
                })
                .collect();
            finals.sort_by_key(|row| row.match_.order);
            let Some(row) = finals.into_iter().next() else {
                return Ok(false);
            };
            row.match_.team1 = Some(team1);
            row.match_.team2 = Some(team2);
            Ok(true)
        }

        async fn upsert_stats(
            &self,
            match_id: MatchId,
            entries: &[MatchStatEntry],
        ) -> ServiceResult<()> {
            let mut stats = self.stats.lock().unwrap();
            for entry in entries {
                let stat = MatchStat {
                    match_id,
                    player_id: entry.player_id,
                    coins_pocketed: entry.coins_pocketed,
                    strikers_pocketed: entry.strikers_pocketed,
                    coins_fined: entry.coins_fined,
                    shots_taken: entry.shots_taken,
                };
                match stats.iter_mut().find(|row| {
                    row.stat.match_id == match_id && row.stat.player_id == entry.player_id
                }) {
                    Some(row) => {
                        row.stat = stat;
                        row.void = false;
                    }
                    None => stats.push(StatRow { stat, void: false }),
                }
            }
            Ok(())
        }

        async fn get_stats(&self, match_id: MatchId) -> ServiceResult<Vec<MatchStat>> {
            let mut stats: Vec<MatchStat> = self
                .stats
                .lock()
                .unwrap()
                .iter()
                .filter(|row| !row.void && row.stat.match_id == match_id)
                .map(|row| row.stat)
                .collect();
            stats.sort_by_key(|s| s.player_id);
            Ok(stats)
        }
    }

    /// Standings whose rows the test can swap out mid-scenario.
    #[derive(Clone, Default)]
    struct SharedStandingsSource {
        rows: Arc<Mutex<Vec<StandingRow>>>,
    }

    #[async_trait::async_trait]
    impl StandingsSource for SharedStandingsSource {
        async fn fetch_standings(&self, _season_id: SeasonId) -> ServiceResult<RawStandings> {
            Ok(RawStandings {
                rows: self.rows.lock().unwrap().clone(),
                season_status: SeasonStatus::InProgress,
            })
        }
    }

    fn standing(team_id: TeamId, matches_played: i64, wins: i64, net_points: i64) -> StandingRow {
        StandingRow {
            team_id,
            team_name: format!("Team {}", team_id),
            matches_played,
            wins,
            points: wins * 2,
            net_points,
            head_to_head_wins: 0,
            is_winner: false,
        }
    }

    fn league_create(season_id: SeasonId, team1: TeamId, team2: TeamId) -> MatchCreate {
        MatchCreate {
            team1: Some(team1),
            team2: Some(team2),
            scheduled_date: NaiveDate::from_ymd_opt(2025, 7, 12).unwrap(),
            duration: None,
            extra: None,
            golden_strike: false,
            category: MatchCategory::League,
            status: MatchStatus::NotStarted,
            order: None,
            season_id,
            net_points: None,
            outcome: None,
        }
    }

    fn final_placeholder(season_id: SeasonId) -> MatchCreate {
        MatchCreate {
            team1: None,
            team2: None,
            scheduled_date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            duration: None,
            extra: None,
            golden_strike: false,
            category: MatchCategory::Final,
            status: MatchStatus::NotStarted,
            order: None,
            season_id,
            net_points: None,
            outcome: None,
        }
    }

    fn complete(outcome: MatchOutcome, net_points: i32) -> MatchUpdate {
        MatchUpdate {
            status: Some(MatchStatus::Completed),
            outcome: Some(outcome),
            net_points: Some(net_points),
            duration: Some(1800),
            ..Default::default()
        }
    }

    fn make_service() -> (MatchServiceImpl, SharedStandingsSource) {
        let repo = InMemoryMatchRepository::new(vec![SeasonRow {
            id: 1,
            status: SeasonStatus::InProgress,
        }]);
        let standings = SharedStandingsSource::default();
        let service =
            MatchServiceImpl::new(Arc::new(Box::new(repo)), Arc::new(Box::new(standings.clone())));
        (service, standings)
    }

    #[tokio::test]
    async fn test_create_rejects_identical_teams() {
        let (service, _) = make_service();
        let mut request = league_create(1, 10, 10);
        let result = service.create_match(request.clone()).await;
        assert!(matches!(result, Err(ServiceError::Validation(..))));

        request.team2 = Some(20);
        assert!(service.create_match(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_requires_both_teams_for_league() {
        let (service, _) = make_service();
        let mut request = league_create(1, 10, 20);
        request.team2 = None;
        assert!(matches!(
            service.create_match(request.clone()).await,
            Err(ServiceError::Validation(..))
        ));
        request.team1 = None;
        assert!(matches!(
            service.create_match(request).await,
            Err(ServiceError::Validation(..))
        ));

        // A final placeholder with no teams is the one allowed exception.
        assert!(service.create_match(final_placeholder(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_second_final() {
        let (service, _) = make_service();
        service.create_match(final_placeholder(1)).await.unwrap();
        assert!(matches!(
            service.create_match(final_placeholder(1)).await,
            Err(ServiceError::Conflict(..))
        ));
    }

    #[tokio::test]
    async fn test_order_is_assigned_sequentially() {
        let (service, _) = make_service();
        let m1 = service.create_match(league_create(1, 10, 20)).await.unwrap();
        let m2 = service.create_match(league_create(1, 10, 30)).await.unwrap();
        assert_eq!(m1.order, 1);
        assert_eq!(m2.order, 2);
        assert_eq!(service.next_match_order(1).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_next_order_fails_for_missing_or_completed_season() {
        let repo = InMemoryMatchRepository::new(vec![SeasonRow {
            id: 2,
            status: SeasonStatus::Completed,
        }]);
        let service = MatchServiceImpl::new(
            Arc::new(Box::new(repo)),
            Arc::new(Box::new(MockStandingsSource::default())),
        );
        assert!(matches!(
            service.next_match_order(2).await,
            Err(ServiceError::NotFound(..))
        ));
        assert!(matches!(
            service.next_match_order(99).await,
            Err(ServiceError::NotFound(..))
        ));
    }

    #[tokio::test]
    async fn test_soft_deleted_match_disappears() {
        let (service, _) = make_service();
        let m = service.create_match(league_create(1, 10, 20)).await.unwrap();
        service.delete_match(m.id).await.unwrap();

        assert!(matches!(
            service.get_match(m.id).await,
            Err(ServiceError::NotFound(..))
        ));
        assert!(service.get_matches(Some(1)).await.unwrap().is_empty());
        assert!(matches!(
            service.delete_match(m.id).await,
            Err(ServiceError::NotFound(..))
        ));
        assert!(matches!(
            service
                .update_match(m.id, complete(MatchOutcome::Team1Won, 5))
                .await,
            Err(ServiceError::NotFound(..))
        ));
    }

    #[tokio::test]
    async fn test_backward_status_transition_is_rejected() {
        let (service, _) = make_service();
        let m = service.create_match(league_create(1, 10, 20)).await.unwrap();
        service
            .update_match(
                m.id,
                MatchUpdate {
                    status: Some(MatchStatus::InProgress),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let result = service
            .update_match(
                m.id,
                MatchUpdate {
                    status: Some(MatchStatus::NotStarted),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(..))));
    }

    #[tokio::test]
    async fn test_completed_match_rejects_field_updates() {
        let (service, standings) = make_service();
        let m = service.create_match(league_create(1, 10, 20)).await.unwrap();
        *standings.rows.lock().unwrap() = vec![standing(10, 1, 1, 5), standing(20, 1, 0, -5)];
        service
            .update_match(m.id, complete(MatchOutcome::Team1Won, 5))
            .await
            .unwrap();

        let result = service
            .update_match(
                m.id,
                MatchUpdate {
                    duration: Some(2400),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(..))));
    }

    #[tokio::test]
    async fn test_final_sync_waits_for_league_completion() {
        let (service, standings) = make_service();
        let final_match = service.create_match(final_placeholder(1)).await.unwrap();
        let m1 = service.create_match(league_create(1, 10, 20)).await.unwrap();
        let m2 = service.create_match(league_create(1, 10, 30)).await.unwrap();
        let m3 = service.create_match(league_create(1, 20, 30)).await.unwrap();

        // A beats B 5-3, A beats C 6-2; one league match still pending.
        *standings.rows.lock().unwrap() = vec![
            standing(10, 2, 2, 6),
            standing(20, 1, 0, -2),
            standing(30, 1, 0, -4),
        ];
        service
            .update_match(m1.id, complete(MatchOutcome::Team1Won, 2))
            .await
            .unwrap();
        service
            .update_match(m2.id, complete(MatchOutcome::Team1Won, 4))
            .await
            .unwrap();

        let pending_final = service.get_match(final_match.id).await.unwrap();
        assert_eq!(pending_final.team1, None);
        assert_eq!(pending_final.team2, None);

        // B beats C 4-1 closes the league stage.
        *standings.rows.lock().unwrap() = vec![
            standing(10, 2, 2, 6),
            standing(20, 2, 1, 1),
            standing(30, 2, 0, -7),
        ];
        service
            .update_match(m3.id, complete(MatchOutcome::Team1Won, 3))
            .await
            .unwrap();

        let wired_final = service.get_match(final_match.id).await.unwrap();
        assert_eq!(wired_final.team1, Some(10));
        assert_eq!(wired_final.team2, Some(20));
    }

    #[tokio::test]
    async fn test_final_sync_is_idempotent() {
        let (service, standings) = make_service();
        let final_match = service.create_match(final_placeholder(1)).await.unwrap();
        let m1 = service.create_match(league_create(1, 10, 20)).await.unwrap();

        *standings.rows.lock().unwrap() = vec![standing(10, 1, 1, 5), standing(20, 1, 0, -5)];
        service
            .update_match(m1.id, complete(MatchOutcome::Team1Won, 5))
            .await
            .unwrap();
        let first = service.get_match(final_match.id).await.unwrap();
        assert_eq!(first.team1, Some(10));
        assert_eq!(first.team2, Some(20));

        // Re-touching a completed league match re-runs the wiring with the
        // same result.
        service
            .update_match(
                m1.id,
                MatchUpdate {
                    status: Some(MatchStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let second = service.get_match(final_match.id).await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_final_sync_skips_teams_without_matches() {
        let (service, standings) = make_service();
        let final_match = service.create_match(final_placeholder(1)).await.unwrap();
        let m1 = service.create_match(league_create(1, 10, 20)).await.unwrap();

        // Only one team with matches played; the wiring must stay silent.
        *standings.rows.lock().unwrap() = vec![standing(10, 1, 1, 5), standing(20, 0, 0, 0)];
        service
            .update_match(m1.id, complete(MatchOutcome::Team1Won, 5))
            .await
            .unwrap();
        let untouched = service.get_match(final_match.id).await.unwrap();
        assert_eq!(untouched.team1, None);
        assert_eq!(untouched.team2, None);
    }

    #[tokio::test]
    async fn test_upsert_stats_rejects_duplicate_players() {
        let (service, _) = make_service();
        let m = service.create_match(league_create(1, 10, 20)).await.unwrap();
        let entry = MatchStatEntry {
            player_id: 7,
            coins_pocketed: 5,
            strikers_pocketed: 1,
            coins_fined: 0,
            shots_taken: 12,
        };
        let result = service.upsert_match_stats(m.id, vec![entry, entry]).await;
        assert!(matches!(result, Err(ServiceError::Validation(..))));
        // Nothing may have been written.
        assert!(service.upsert_match_stats(m.id, vec![]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_stats_requires_existing_match() {
        let (service, _) = make_service();
        let result = service.upsert_match_stats(42, vec![]).await;
        assert!(matches!(result, Err(ServiceError::NotFound(..))));
    }

    #[tokio::test]
    async fn test_upsert_stats_overwrites_and_sorts() {
        let (service, _) = make_service();
        let m = service.create_match(league_create(1, 10, 20)).await.unwrap();
        let entry = |player_id, coins| MatchStatEntry {
            player_id,
            coins_pocketed: coins,
            strikers_pocketed: 0,
            coins_fined: 1,
            shots_taken: 10,
        };

        let stats = service
            .upsert_match_stats(m.id, vec![entry(9, 3), entry(4, 2)])
            .await
            .unwrap();
        let players: Vec<PlayerId> = stats.iter().map(|s| s.player_id).collect();
        assert_eq!(players, vec![4, 9]);

        // Same payload again: still one row per player, latest values win.
        let stats = service
            .upsert_match_stats(m.id, vec![entry(9, 6)])
            .await
            .unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[1].player_id, 9);
        assert_eq!(stats[1].coins_pocketed, 6);
    }
}

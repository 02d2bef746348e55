use std::sync::Arc;

use serde::Serialize;

use crate::{
    ServiceError, ServiceResult,
    player::PlayerId,
    season::SeasonId,
    team::TeamId,
};

pub type RosterId = i64;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Roster {
    pub id: RosterId,
    pub player_id: PlayerId,
    pub season_id: SeasonId,
    pub team_id: TeamId,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamRosterPlayer {
    pub player_id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TeamRoster {
    pub team_id: TeamId,
    pub season_id: SeasonId,
    pub players: Vec<TeamRosterPlayer>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerSeasonHistoryItem {
    pub season_id: SeasonId,
    pub season_name: String,
    pub team_id: TeamId,
    pub team_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerSeasonHistory {
    pub player_id: PlayerId,
    pub seasons: Vec<PlayerSeasonHistoryItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeasonRosterEntry {
    pub team_id: TeamId,
    pub team_name: String,
    pub player_id: PlayerId,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeasonRoster {
    pub season_id: SeasonId,
    pub rosters: Vec<SeasonRosterEntry>,
}

pub type ArcRosterRepository = Arc<Box<dyn RosterRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait RosterRepository {
    /// Runs the gateway's assignment routine, which owns the one-active-team-
    /// per-player-per-season rule and signals a violation as a conflict.
    async fn assign_player(
        &self,
        season_id: SeasonId,
        team_id: TeamId,
        player_id: PlayerId,
    ) -> ServiceResult<()>;
    async fn get_by_player_season(
        &self,
        player_id: PlayerId,
        season_id: SeasonId,
    ) -> ServiceResult<Option<Roster>>;
    async fn remove_player(&self, season_id: SeasonId, player_id: PlayerId)
    -> ServiceResult<bool>;
    async fn get_team_roster(
        &self,
        season_id: SeasonId,
        team_id: TeamId,
    ) -> ServiceResult<Vec<TeamRosterPlayer>>;
    async fn get_player_history(
        &self,
        player_id: PlayerId,
    ) -> ServiceResult<Vec<PlayerSeasonHistoryItem>>;
    async fn get_season_rosters(
        &self,
        season_id: SeasonId,
    ) -> ServiceResult<Vec<SeasonRosterEntry>>;
}

pub type ArcRosterService = Arc<Box<dyn RosterService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait RosterService {
    async fn assign_player(
        &self,
        season_id: SeasonId,
        team_id: TeamId,
        player_id: PlayerId,
    ) -> ServiceResult<Roster>;
    async fn remove_player(&self, season_id: SeasonId, player_id: PlayerId) -> ServiceResult<()>;
    async fn get_team_roster(
        &self,
        season_id: SeasonId,
        team_id: TeamId,
    ) -> ServiceResult<TeamRoster>;
    async fn get_player_history(&self, player_id: PlayerId) -> ServiceResult<PlayerSeasonHistory>;
    async fn get_season_rosters(&self, season_id: SeasonId) -> ServiceResult<SeasonRoster>;
}

pub struct RosterServiceImpl {
    roster_repository: ArcRosterRepository,
}

impl RosterServiceImpl {
    pub fn new(roster_repository: ArcRosterRepository) -> Self {
        Self { roster_repository }
    }
}

#[async_trait::async_trait]
impl RosterService for RosterServiceImpl {
    async fn assign_player(
        &self,
        season_id: SeasonId,
        team_id: TeamId,
        player_id: PlayerId,
    ) -> ServiceResult<Roster> {
        self.roster_repository
            .assign_player(season_id, team_id, player_id)
            .await?;
        match self
            .roster_repository
            .get_by_player_season(player_id, season_id)
            .await?
        {
            Some(roster) => Ok(roster),
            None => ServiceError::internal("Assignment failed"),
        }
    }

    async fn remove_player(&self, season_id: SeasonId, player_id: PlayerId) -> ServiceResult<()> {
        if !self
            .roster_repository
            .remove_player(season_id, player_id)
            .await?
        {
            return ServiceError::not_found("Roster entry not found");
        }
        Ok(())
    }

    async fn get_team_roster(
        &self,
        season_id: SeasonId,
        team_id: TeamId,
    ) -> ServiceResult<TeamRoster> {
        let players = self
            .roster_repository
            .get_team_roster(season_id, team_id)
            .await?;
        Ok(TeamRoster {
            team_id,
            season_id,
            players,
        })
    }

    async fn get_player_history(&self, player_id: PlayerId) -> ServiceResult<PlayerSeasonHistory> {
        let seasons = self.roster_repository.get_player_history(player_id).await?;
        Ok(PlayerSeasonHistory { player_id, seasons })
    }

    async fn get_season_rosters(&self, season_id: SeasonId) -> ServiceResult<SeasonRoster> {
        let rosters = self.roster_repository.get_season_rosters(season_id).await?;
        Ok(SeasonRoster { season_id, rosters })
    }
}

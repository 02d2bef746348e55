use std::sync::Arc;

use log::info;

use crate::{
    ServiceResult,
    country::{ArcCountryRepository, ArcCountryService, CountryServiceImpl},
    league_table::ArcStandingsSource,
    matches::{ArcMatchRepository, ArcMatchService, MatchServiceImpl},
    player::{ArcPlayerRepository, ArcPlayerService, PlayerServiceImpl},
    roster::{ArcRosterRepository, ArcRosterService, RosterServiceImpl},
    season::{ArcSeasonRepository, ArcSeasonService, SeasonServiceImpl},
    stats::{ArcHeadToHeadSource, ArcStatsService, StatsServiceImpl},
    team::{ArcTeamRepository, ArcTeamService, TeamServiceImpl},
};

#[derive(Clone)]
pub struct AppState {
    pub country_service: ArcCountryService,
    pub player_service: ArcPlayerService,
    pub team_service: ArcTeamService,
    pub season_service: ArcSeasonService,
    pub match_service: ArcMatchService,
    pub roster_service: ArcRosterService,
    pub stats_service: ArcStatsService,
}

impl AppState {
    /// Startup probe: touches the gateway once so a misconfigured database
    /// fails the process early instead of on the first request.
    pub async fn start(&self) -> ServiceResult<()> {
        let seasons = self.season_service.get_all_seasons().await?;
        info!("Connected to gateway, {} seasons on record", seasons.len());
        Ok(())
    }
}

pub fn construct_app(
    country_repository: ArcCountryRepository,
    player_repository: ArcPlayerRepository,
    team_repository: ArcTeamRepository,
    season_repository: ArcSeasonRepository,
    match_repository: ArcMatchRepository,
    roster_repository: ArcRosterRepository,
    standings_source: ArcStandingsSource,
    head_to_head_source: ArcHeadToHeadSource,
) -> AppState {
    let country_service: ArcCountryService = Arc::new(Box::new(CountryServiceImpl::new(
        country_repository.clone(),
    )));

    let player_service: ArcPlayerService = Arc::new(Box::new(PlayerServiceImpl::new(
        player_repository.clone(),
        country_service.clone(),
    )));

    let team_service: ArcTeamService =
        Arc::new(Box::new(TeamServiceImpl::new(team_repository.clone())));

    let season_service: ArcSeasonService = Arc::new(Box::new(SeasonServiceImpl::new(
        season_repository.clone(),
        standings_source.clone(),
    )));

    let match_service: ArcMatchService = Arc::new(Box::new(MatchServiceImpl::new(
        match_repository.clone(),
        standings_source.clone(),
    )));

    let roster_service: ArcRosterService = Arc::new(Box::new(RosterServiceImpl::new(
        roster_repository.clone(),
    )));

    let stats_service: ArcStatsService = Arc::new(Box::new(StatsServiceImpl::new(
        head_to_head_source.clone(),
    )));

    AppState {
        country_service,
        player_service,
        team_service,
        season_service,
        match_service,
        roster_service,
        stats_service,
    }
}

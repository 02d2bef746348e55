use std::sync::Arc;

use cpl_domain::{
    app::construct_app,
    country::ArcCountryRepository,
    league_table::ArcStandingsSource,
    matches::ArcMatchRepository,
    player::ArcPlayerRepository,
    roster::ArcRosterRepository,
    season::ArcSeasonRepository,
    stats::ArcHeadToHeadSource,
    team::ArcTeamRepository,
};
use cpl_persistence_mysql::{
    countries::MySqlCountryRepository, create_db_pool, matches::MySqlMatchRepository,
    players::MySqlPlayerRepository, rosters::MySqlRosterRepository, seasons::MySqlSeasonRepository,
    standings::MySqlStandingsSource, stats::MySqlHeadToHeadSource, teams::MySqlTeamRepository,
};
use log::info;

mod logs;

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().expect("Failed to load .env file");

    logs::init_logger();

    let pool = create_db_pool().await;

    let country_repo: ArcCountryRepository =
        Arc::new(Box::new(MySqlCountryRepository::new(pool.clone())));
    let player_repo: ArcPlayerRepository =
        Arc::new(Box::new(MySqlPlayerRepository::new(pool.clone())));
    let team_repo: ArcTeamRepository = Arc::new(Box::new(MySqlTeamRepository::new(pool.clone())));
    let season_repo: ArcSeasonRepository =
        Arc::new(Box::new(MySqlSeasonRepository::new(pool.clone())));
    let match_repo: ArcMatchRepository =
        Arc::new(Box::new(MySqlMatchRepository::new(pool.clone())));
    let roster_repo: ArcRosterRepository =
        Arc::new(Box::new(MySqlRosterRepository::new(pool.clone())));
    let standings_source: ArcStandingsSource =
        Arc::new(Box::new(MySqlStandingsSource::new(pool.clone())));
    let head_to_head_source: ArcHeadToHeadSource =
        Arc::new(Box::new(MySqlHeadToHeadSource::new(pool.clone())));

    let app = construct_app(
        country_repo,
        player_repo,
        team_repo,
        season_repo,
        match_repo,
        roster_repo,
        standings_source,
        head_to_head_source,
    );

    app.start().await.expect("Failed to start application");

    info!("CPL backend ready; transport layer may attach");

    shutdown_signal().await;

    pool.close().await;
    info!("Gateway pool closed, exiting");
}

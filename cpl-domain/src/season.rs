use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    ServiceError, ServiceResult,
    league_table::{ArcStandingsSource, LeagueTable, compute_league_table},
    util::validate_url,
};

pub type SeasonId = i64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl SeasonStatus {
    pub fn as_i32(self) -> i32 {
        match self {
            SeasonStatus::NotStarted => 1,
            SeasonStatus::InProgress => 2,
            SeasonStatus::Completed => 3,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(SeasonStatus::NotStarted),
            2 => Some(SeasonStatus::InProgress),
            3 => Some(SeasonStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Season {
    pub id: SeasonId,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub logo_url: Option<String>,
    pub status: SeasonStatus,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SeasonCreate {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub logo_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SeasonUpdate {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub logo_url: Option<String>,
    pub status: Option<SeasonStatus>,
}

impl SeasonUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.logo_url.is_none()
            && self.status.is_none()
    }
}

pub type ArcSeasonRepository = Arc<Box<dyn SeasonRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait SeasonRepository {
    async fn get_by_id(&self, id: SeasonId) -> ServiceResult<Option<Season>>;
    async fn get_all(&self) -> ServiceResult<Vec<Season>>;
    async fn create(&self, season: &SeasonCreate) -> ServiceResult<Season>;
    async fn update(&self, id: SeasonId, update: &SeasonUpdate) -> ServiceResult<Option<Season>>;
    async fn soft_delete(&self, id: SeasonId) -> ServiceResult<bool>;
    async fn exists_by_name(&self, name: &str) -> ServiceResult<bool>;
}

pub type ArcSeasonService = Arc<Box<dyn SeasonService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait SeasonService {
    async fn get_season(&self, id: SeasonId) -> ServiceResult<Season>;
    async fn get_all_seasons(&self) -> ServiceResult<Vec<Season>>;
    async fn create_season(&self, request: SeasonCreate) -> ServiceResult<Season>;
    async fn update_season(&self, id: SeasonId, request: SeasonUpdate) -> ServiceResult<Season>;
    async fn delete_season(&self, id: SeasonId) -> ServiceResult<()>;
    async fn get_league_table(&self, season_id: SeasonId) -> ServiceResult<LeagueTable>;
}

pub struct SeasonServiceImpl {
    season_repository: ArcSeasonRepository,
    standings_source: ArcStandingsSource,
}

impl SeasonServiceImpl {
    pub fn new(season_repository: ArcSeasonRepository, standings_source: ArcStandingsSource) -> Self {
        Self {
            season_repository,
            standings_source,
        }
    }

    fn validate_name(name: &str) -> ServiceResult<String> {
        let name = name.trim().to_string();
        if name.len() < 3 || name.len() > 255 {
            return ServiceError::validation("Season name must be between 3 and 255 characters");
        }
        Ok(name)
    }

    fn validate_date_range(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> ServiceResult<()> {
        if let (Some(start), Some(end)) = (start_date, end_date)
            && end < start
        {
            return ServiceError::validation("End date cannot be before start date");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SeasonService for SeasonServiceImpl {
    async fn get_season(&self, id: SeasonId) -> ServiceResult<Season> {
        match self.season_repository.get_by_id(id).await? {
            Some(season) => Ok(season),
            None => ServiceError::not_found("Season not found"),
        }
    }

    async fn get_all_seasons(&self) -> ServiceResult<Vec<Season>> {
        self.season_repository.get_all().await
    }

    async fn create_season(&self, request: SeasonCreate) -> ServiceResult<Season> {
        let name = Self::validate_name(&request.name)?;
        if self.season_repository.exists_by_name(&name).await? {
            return ServiceError::conflict("Season already exists");
        }
        Self::validate_date_range(request.start_date, request.end_date)?;
        let logo_url = match request.logo_url {
            Some(url) => Some(validate_url(&url)?),
            None => None,
        };

        self.season_repository
            .create(&SeasonCreate {
                name,
                start_date: request.start_date,
                end_date: request.end_date,
                logo_url,
            })
            .await
    }

    async fn update_season(&self, id: SeasonId, request: SeasonUpdate) -> ServiceResult<Season> {
        let Some(existing) = self.season_repository.get_by_id(id).await? else {
            return ServiceError::not_found("Season not found");
        };
        if request.is_empty() {
            return Ok(existing);
        }

        let mut normalized = SeasonUpdate::default();
        if let Some(name) = request.name {
            let name = Self::validate_name(&name)?;
            if name != existing.name && self.season_repository.exists_by_name(&name).await? {
                return ServiceError::conflict("Season already exists");
            }
            normalized.name = Some(name);
        }
        Self::validate_date_range(
            request.start_date.or(existing.start_date),
            request.end_date.or(existing.end_date),
        )?;
        normalized.start_date = request.start_date;
        normalized.end_date = request.end_date;
        normalized.status = request.status;
        if let Some(url) = request.logo_url {
            normalized.logo_url = Some(validate_url(&url)?);
        }

        match self.season_repository.update(id, &normalized).await? {
            Some(season) => Ok(season),
            None => ServiceError::not_found("Season not found"),
        }
    }

    async fn delete_season(&self, id: SeasonId) -> ServiceResult<()> {
        if self.season_repository.get_by_id(id).await?.is_none() {
            return ServiceError::not_found("Season not found");
        }
        if !self.season_repository.soft_delete(id).await? {
            return ServiceError::not_found("Season not found");
        }
        Ok(())
    }

    async fn get_league_table(&self, season_id: SeasonId) -> ServiceResult<LeagueTable> {
        if season_id <= 0 {
            return ServiceError::validation("Invalid season id");
        }
        if self.season_repository.get_by_id(season_id).await?.is_none() {
            return ServiceError::not_found("Season not found");
        }
        let raw = self.standings_source.fetch_standings(season_id).await?;
        Ok(compute_league_table(raw))
    }
}

#[derive(Default, Clone)]
pub struct MockSeasonRepository {
    pub seasons: Vec<Season>,
}

#[async_trait::async_trait]
impl SeasonRepository for MockSeasonRepository {
    async fn get_by_id(&self, id: SeasonId) -> ServiceResult<Option<Season>> {
        Ok(self.seasons.iter().find(|s| s.id == id).cloned())
    }

    async fn get_all(&self) -> ServiceResult<Vec<Season>> {
        Ok(self.seasons.clone())
    }

    async fn create(&self, _season: &SeasonCreate) -> ServiceResult<Season> {
        ServiceError::internal("not supported by mock")
    }

    async fn update(&self, id: SeasonId, update: &SeasonUpdate) -> ServiceResult<Option<Season>> {
        let Some(mut season) = self.seasons.iter().find(|s| s.id == id).cloned() else {
            return Ok(None);
        };
        if let Some(name) = &update.name {
            season.name = name.clone();
        }
        if let Some(status) = update.status {
            season.status = status;
        }
        Ok(Some(season))
    }

    async fn soft_delete(&self, id: SeasonId) -> ServiceResult<bool> {
        Ok(self.seasons.iter().any(|s| s.id == id))
    }

    async fn exists_by_name(&self, name: &str) -> ServiceResult<bool> {
        Ok(self.seasons.iter().any(|s| s.name == name))
    }
}

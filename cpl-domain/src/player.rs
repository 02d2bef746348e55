use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    ServiceError, ServiceResult,
    country::{ArcCountryService, CountryId},
    util::validate_url,
};

pub type PlayerId = i64;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub nationality_id: Option<CountryId>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlayerCreate {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub nationality_id: Option<CountryId>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlayerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub avatar_url: Option<String>,
    pub nationality_id: Option<CountryId>,
}

impl PlayerUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.date_of_birth.is_none()
            && self.avatar_url.is_none()
            && self.nationality_id.is_none()
    }
}

pub type ArcPlayerRepository = Arc<Box<dyn PlayerRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerRepository {
    async fn get_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>>;
    async fn get_all(&self) -> ServiceResult<Vec<Player>>;
    async fn create(&self, player: &PlayerCreate) -> ServiceResult<Player>;
    async fn update(&self, id: PlayerId, update: &PlayerUpdate) -> ServiceResult<Option<Player>>;
    async fn soft_delete(&self, id: PlayerId) -> ServiceResult<bool>;
}

pub type ArcPlayerService = Arc<Box<dyn PlayerService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerService {
    async fn get_player(&self, id: PlayerId) -> ServiceResult<Player>;
    async fn get_all_players(&self) -> ServiceResult<Vec<Player>>;
    async fn create_player(&self, request: PlayerCreate) -> ServiceResult<Player>;
    async fn update_player(&self, id: PlayerId, request: PlayerUpdate) -> ServiceResult<Player>;
    async fn delete_player(&self, id: PlayerId) -> ServiceResult<()>;
}

pub struct PlayerServiceImpl {
    player_repository: ArcPlayerRepository,
    country_service: ArcCountryService,
}

impl PlayerServiceImpl {
    pub fn new(player_repository: ArcPlayerRepository, country_service: ArcCountryService) -> Self {
        Self {
            player_repository,
            country_service,
        }
    }

    fn validate_date_of_birth(date_of_birth: &NaiveDate) -> ServiceResult<()> {
        if *date_of_birth > chrono::Utc::now().date_naive() {
            return ServiceError::validation("Date of birth cannot be in the future");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PlayerService for PlayerServiceImpl {
    async fn get_player(&self, id: PlayerId) -> ServiceResult<Player> {
        match self.player_repository.get_by_id(id).await? {
            Some(player) => Ok(player),
            None => ServiceError::not_found("Player not found"),
        }
    }

    async fn get_all_players(&self) -> ServiceResult<Vec<Player>> {
        self.player_repository.get_all().await
    }

    async fn create_player(&self, request: PlayerCreate) -> ServiceResult<Player> {
        let first_name = request.first_name.trim().to_string();
        let last_name = request.last_name.trim().to_string();

        if first_name.is_empty() {
            return ServiceError::validation("First name is required");
        }
        if last_name.is_empty() {
            return ServiceError::validation("Last name is required");
        }
        if let Some(date_of_birth) = &request.date_of_birth {
            Self::validate_date_of_birth(date_of_birth)?;
        }
        if let Some(nationality_id) = request.nationality_id {
            self.country_service
                .validate_country_exists(nationality_id)
                .await?;
        }
        let avatar_url = match request.avatar_url {
            Some(url) => Some(validate_url(&url)?),
            None => None,
        };

        self.player_repository
            .create(&PlayerCreate {
                first_name,
                last_name,
                date_of_birth: request.date_of_birth,
                avatar_url,
                nationality_id: request.nationality_id,
            })
            .await
    }

    async fn update_player(&self, id: PlayerId, request: PlayerUpdate) -> ServiceResult<Player> {
        let Some(existing) = self.player_repository.get_by_id(id).await? else {
            return ServiceError::not_found("Player not found");
        };
        if request.is_empty() {
            return Ok(existing);
        }

        let mut normalized = PlayerUpdate::default();

        if let Some(first_name) = request.first_name {
            let first_name = first_name.trim().to_string();
            if first_name.is_empty() {
                return ServiceError::validation("First name cannot be empty");
            }
            normalized.first_name = Some(first_name);
        }
        if let Some(last_name) = request.last_name {
            let last_name = last_name.trim().to_string();
            if last_name.is_empty() {
                return ServiceError::validation("Last name cannot be empty");
            }
            normalized.last_name = Some(last_name);
        }
        if let Some(date_of_birth) = request.date_of_birth {
            Self::validate_date_of_birth(&date_of_birth)?;
            normalized.date_of_birth = Some(date_of_birth);
        }
        if let Some(nationality_id) = request.nationality_id {
            self.country_service
                .validate_country_exists(nationality_id)
                .await?;
            normalized.nationality_id = Some(nationality_id);
        }
        if let Some(url) = request.avatar_url {
            normalized.avatar_url = Some(validate_url(&url)?);
        }

        match self.player_repository.update(id, &normalized).await? {
            Some(player) => Ok(player),
            None => ServiceError::not_found("Player not found"),
        }
    }

    async fn delete_player(&self, id: PlayerId) -> ServiceResult<()> {
        if self.player_repository.get_by_id(id).await?.is_none() {
            return ServiceError::not_found("Player not found");
        }
        if !self.player_repository.soft_delete(id).await? {
            return ServiceError::not_found("Player not found");
        }
        Ok(())
    }
}

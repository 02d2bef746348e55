use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{ServiceError, ServiceResult, util::validate_url};

pub type TeamId = i64;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub slogan: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TeamCreate {
    pub name: String,
    pub slogan: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub slogan: Option<String>,
    pub logo_url: Option<String>,
}

impl TeamUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.slogan.is_none() && self.logo_url.is_none()
    }
}

pub type ArcTeamRepository = Arc<Box<dyn TeamRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait TeamRepository {
    async fn get_by_id(&self, id: TeamId) -> ServiceResult<Option<Team>>;
    async fn get_all(&self) -> ServiceResult<Vec<Team>>;
    async fn create(&self, team: &TeamCreate) -> ServiceResult<Team>;
    async fn update(&self, id: TeamId, update: &TeamUpdate) -> ServiceResult<Option<Team>>;
    async fn soft_delete(&self, id: TeamId) -> ServiceResult<bool>;
}

pub type ArcTeamService = Arc<Box<dyn TeamService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait TeamService {
    async fn get_team(&self, id: TeamId) -> ServiceResult<Team>;
    async fn get_all_teams(&self) -> ServiceResult<Vec<Team>>;
    async fn create_team(&self, request: TeamCreate) -> ServiceResult<Team>;
    async fn update_team(&self, id: TeamId, request: TeamUpdate) -> ServiceResult<Team>;
    async fn delete_team(&self, id: TeamId) -> ServiceResult<()>;
}

pub struct TeamServiceImpl {
    team_repository: ArcTeamRepository,
}

impl TeamServiceImpl {
    pub fn new(team_repository: ArcTeamRepository) -> Self {
        Self { team_repository }
    }
}

#[async_trait::async_trait]
impl TeamService for TeamServiceImpl {
    async fn get_team(&self, id: TeamId) -> ServiceResult<Team> {
        match self.team_repository.get_by_id(id).await? {
            Some(team) => Ok(team),
            None => ServiceError::not_found("Team not found"),
        }
    }

    async fn get_all_teams(&self) -> ServiceResult<Vec<Team>> {
        self.team_repository.get_all().await
    }

    async fn create_team(&self, request: TeamCreate) -> ServiceResult<Team> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return ServiceError::validation("Team name is required");
        }
        let logo_url = match request.logo_url {
            Some(url) => Some(validate_url(&url)?),
            None => None,
        };

        self.team_repository
            .create(&TeamCreate {
                name,
                slogan: request.slogan.map(|s| s.trim().to_string()),
                logo_url,
            })
            .await
    }

    async fn update_team(&self, id: TeamId, request: TeamUpdate) -> ServiceResult<Team> {
        let Some(existing) = self.team_repository.get_by_id(id).await? else {
            return ServiceError::not_found("Team not found");
        };
        if request.is_empty() {
            return Ok(existing);
        }

        let mut normalized = TeamUpdate::default();
        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return ServiceError::validation("Team name cannot be empty");
            }
            normalized.name = Some(name);
        }
        normalized.slogan = request.slogan.map(|s| s.trim().to_string());
        if let Some(url) = request.logo_url {
            normalized.logo_url = Some(validate_url(&url)?);
        }

        match self.team_repository.update(id, &normalized).await? {
            Some(team) => Ok(team),
            None => ServiceError::not_found("Team not found"),
        }
    }

    async fn delete_team(&self, id: TeamId) -> ServiceResult<()> {
        if !self.team_repository.soft_delete(id).await? {
            return ServiceError::not_found("Team not found");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct InMemoryTeamRepository {
        teams: Mutex<Vec<Team>>,
        next_id: Mutex<TeamId>,
    }

    #[async_trait::async_trait]
    impl TeamRepository for InMemoryTeamRepository {
        async fn get_by_id(&self, id: TeamId) -> ServiceResult<Option<Team>> {
            Ok(self
                .teams
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == id)
                .cloned())
        }

        async fn get_all(&self) -> ServiceResult<Vec<Team>> {
            Ok(self.teams.lock().unwrap().clone())
        }

        async fn create(&self, team: &TeamCreate) -> ServiceResult<Team> {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let created = Team {
                id: *next_id,
                name: team.name.clone(),
                slogan: team.slogan.clone(),
                logo_url: team.logo_url.clone(),
            };
            self.teams.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn update(&self, id: TeamId, update: &TeamUpdate) -> ServiceResult<Option<Team>> {
            let mut teams = self.teams.lock().unwrap();
            let Some(team) = teams.iter_mut().find(|t| t.id == id) else {
                return Ok(None);
            };
            if let Some(name) = &update.name {
                team.name = name.clone();
            }
            if let Some(slogan) = &update.slogan {
                team.slogan = Some(slogan.clone());
            }
            Ok(Some(team.clone()))
        }

        async fn soft_delete(&self, id: TeamId) -> ServiceResult<bool> {
            let mut teams = self.teams.lock().unwrap();
            let before = teams.len();
            teams.retain(|t| t.id != id);
            Ok(teams.len() < before)
        }
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let service = TeamServiceImpl::new(Arc::new(Box::new(InMemoryTeamRepository::default())));
        let created = service
            .create_team(TeamCreate {
                name: " Chennai Strikers ".into(),
                slogan: Some("Strike first".into()),
                logo_url: None,
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Chennai Strikers");

        let updated = service
            .update_team(
                created.id,
                TeamUpdate {
                    slogan: Some("Strike fast".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.slogan.as_deref(), Some("Strike fast"));
    }

    #[tokio::test]
    async fn test_delete_missing_team_reports_not_found() {
        let service = TeamServiceImpl::new(Arc::new(Box::new(InMemoryTeamRepository::default())));
        assert!(matches!(
            service.delete_team(3).await,
            Err(ServiceError::NotFound(..))
        ));
    }
}

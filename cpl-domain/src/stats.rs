use std::sync::Arc;

use serde::Serialize;

use crate::{ServiceError, ServiceResult, team::TeamId};

/// Lifetime pairwise aggregate between two teams, independent of season.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HeadToHead {
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub matches_played: i64,
    pub team1_wins: i64,
    pub team2_wins: i64,
    pub team1_net_points: i64,
    pub team2_net_points: i64,
}

impl HeadToHead {
    pub fn empty(team1_id: TeamId, team2_id: TeamId) -> Self {
        Self {
            team1_id,
            team2_id,
            matches_played: 0,
            team1_wins: 0,
            team2_wins: 0,
            team1_net_points: 0,
            team2_net_points: 0,
        }
    }
}

pub type ArcHeadToHeadSource = Arc<Box<dyn HeadToHeadSource + Send + Sync + 'static>>;

/// Opaque pairwise-history aggregate. `None` means the pair has no recorded
/// matches, which is a valid steady state rather than an error.
#[async_trait::async_trait]
pub trait HeadToHeadSource {
    async fn lifetime_head_to_head(
        &self,
        team1_id: TeamId,
        team2_id: TeamId,
    ) -> ServiceResult<Option<HeadToHead>>;
}

pub type ArcStatsService = Arc<Box<dyn StatsService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait StatsService {
    async fn get_head_to_head(
        &self,
        team1_id: TeamId,
        team2_id: TeamId,
    ) -> ServiceResult<HeadToHead>;
}

pub struct StatsServiceImpl {
    head_to_head_source: ArcHeadToHeadSource,
}

impl StatsServiceImpl {
    pub fn new(head_to_head_source: ArcHeadToHeadSource) -> Self {
        Self { head_to_head_source }
    }
}

#[async_trait::async_trait]
impl StatsService for StatsServiceImpl {
    async fn get_head_to_head(
        &self,
        team1_id: TeamId,
        team2_id: TeamId,
    ) -> ServiceResult<HeadToHead> {
        if team1_id == team2_id {
            return ServiceError::validation("Cannot compare a team with itself");
        }
        let aggregate = self
            .head_to_head_source
            .lifetime_head_to_head(team1_id, team2_id)
            .await?;
        Ok(aggregate.unwrap_or_else(|| HeadToHead::empty(team1_id, team2_id)))
    }
}

#[derive(Default, Clone)]
pub struct MockHeadToHeadSource {
    pub aggregate: Option<HeadToHead>,
}

#[async_trait::async_trait]
impl HeadToHeadSource for MockHeadToHeadSource {
    async fn lifetime_head_to_head(
        &self,
        _team1_id: TeamId,
        _team2_id: TeamId,
    ) -> ServiceResult<Option<HeadToHead>> {
        Ok(self.aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with(aggregate: Option<HeadToHead>) -> StatsServiceImpl {
        StatsServiceImpl::new(Arc::new(Box::new(MockHeadToHeadSource { aggregate })))
    }

    #[tokio::test]
    async fn test_identical_teams_always_rejected() {
        let service = service_with(Some(HeadToHead::empty(5, 6)));
        assert!(matches!(
            service.get_head_to_head(5, 5).await,
            Err(ServiceError::Validation(..))
        ));
    }

    #[tokio::test]
    async fn test_missing_aggregate_yields_zeros() {
        let service = service_with(None);
        let result = service.get_head_to_head(5, 6).await.unwrap();
        assert_eq!(result, HeadToHead::empty(5, 6));
    }

    #[tokio::test]
    async fn test_aggregate_row_is_passed_through() {
        let aggregate = HeadToHead {
            team1_id: 5,
            team2_id: 6,
            matches_played: 4,
            team1_wins: 3,
            team2_wins: 1,
            team1_net_points: 11,
            team2_net_points: -11,
        };
        let service = service_with(Some(aggregate));
        assert_eq!(service.get_head_to_head(5, 6).await.unwrap(), aggregate);
    }
}

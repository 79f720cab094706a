//! Resolves organization lookups against the store, composing the activity
//! hierarchy walk, substring search and the geo-radius filter.

use std::collections::HashSet;

use crate::db::dao::{ActivityDao, OrganizationDao, Result};
use crate::db::executor::DbExecutor;
use crate::hierarchy::ActivityTree;
use crate::model::Organization;

/// Depth bound applied by the "limited" activity search.
pub const DEFAULT_SEARCH_DEPTH: u32 = 3;

#[derive(Clone)]
pub struct OrganizationLocator {
    db: DbExecutor,
}

impl OrganizationLocator {
    pub fn new(db: DbExecutor) -> Self {
        OrganizationLocator { db }
    }

    pub async fn by_building(&self, building_id: i32) -> Result<Vec<Organization>> {
        let rows = self
            .db
            .as_dao::<OrganizationDao>()
            .by_building(building_id)
            .await?;
        Ok(rows.into_iter().map(|row| row.into_client()).collect())
    }

    /// Organizations linked to exactly this activity, no descendant expansion.
    pub async fn by_activity_exact(&self, activity_id: i32) -> Result<Vec<Organization>> {
        let rows = self
            .db
            .as_dao::<OrganizationDao>()
            .by_activity_exact(activity_id)
            .await?;
        Ok(rows.into_iter().map(|row| row.into_client()).collect())
    }

    pub async fn by_activity_recursive(&self, activity_id: i32) -> Result<Vec<Organization>> {
        let ids = self.subtree_ids(activity_id, None).await?;
        self.by_activity_id_set(ids).await
    }

    pub async fn by_activity_recursive_limited(
        &self,
        activity_id: i32,
        max_depth: u32,
    ) -> Result<Vec<Organization>> {
        let ids = self.subtree_ids(activity_id, Some(max_depth)).await?;
        self.by_activity_id_set(ids).await
    }

    pub async fn by_name_substring(&self, text: String) -> Result<Vec<Organization>> {
        let rows = self
            .db
            .as_dao::<OrganizationDao>()
            .by_name_substring(text)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(organization, building)| Organization {
                building: Some(building.into_client()),
                ..organization.into_client()
            })
            .collect())
    }

    pub async fn in_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<Organization>> {
        let rows = self
            .db
            .as_dao::<OrganizationDao>()
            .in_radius(latitude, longitude, radius_km)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(organization, building)| Organization {
                building: Some(building.into_client()),
                ..organization.into_client()
            })
            .collect())
    }

    async fn subtree_ids(
        &self,
        activity_id: i32,
        max_depth: Option<u32>,
    ) -> Result<HashSet<i32>> {
        let dao = self.db.as_dao::<ActivityDao>();
        // existence check first: an unknown root is a NotFound, not an empty set
        dao.get(activity_id).await?;
        let tree = ActivityTree::from_links(dao.parent_links().await?);
        Ok(match max_depth {
            Some(limit) => tree.descendant_ids_bounded(activity_id, limit),
            None => tree.descendant_ids(activity_id),
        })
    }

    async fn by_activity_id_set(&self, ids: HashSet<i32>) -> Result<Vec<Organization>> {
        let rows = self
            .db
            .as_dao::<OrganizationDao>()
            .by_activity_ids(ids)
            .await?;
        Ok(rows.into_iter().map(|row| row.into_client()).collect())
    }
}

use std::collections::HashSet;

use chrono::Utc;
use diesel::prelude::*;

use crate::db::dao::{last_insert_rowid, DaoError, Result};
use crate::db::executor::{do_with_transaction, readonly_transaction, AsDao, ConnType, PoolType};
use crate::db::model::{Activity, Building, NewOrganization, Organization};
use crate::db::schema;
use crate::geo;
use crate::model;

pub struct OrganizationDao<'c> {
    pool: &'c PoolType,
}

impl<'a> AsDao<'a> for OrganizationDao<'a> {
    fn as_dao(pool: &'a PoolType) -> Self {
        OrganizationDao { pool }
    }
}

fn not_found() -> DaoError {
    DaoError::NotFound("Organization not found".to_string())
}

/// Attaches the building and the linked activity set to a bare row.
fn load_detailed(conn: &ConnType, organization: Organization) -> Result<model::Organization> {
    let building: Building = {
        use schema::buildings::dsl;
        dsl::buildings
            .filter(dsl::id.eq(organization.building_id))
            .first(conn)?
    };
    let activities: Vec<Activity> = {
        use schema::organization_activity::dsl;
        dsl::organization_activity
            .inner_join(schema::activities::table)
            .filter(dsl::organization_id.eq(organization.id))
            .select(schema::activities::all_columns)
            .load(conn)?
    };
    Ok(model::Organization {
        building: Some(building.into_client()),
        activities: Some(activities.into_iter().map(Activity::into_client).collect()),
        ..organization.into_client()
    })
}

fn replace_activity_links(conn: &ConnType, organization_id: i32, ids: &[i32]) -> Result<()> {
    use schema::organization_activity::dsl;

    diesel::delete(dsl::organization_activity.filter(dsl::organization_id.eq(organization_id)))
        .execute(conn)?;
    for activity_id in ids {
        diesel::insert_into(dsl::organization_activity)
            .values((
                dsl::organization_id.eq(organization_id),
                dsl::activity_id.eq(*activity_id),
            ))
            .execute(conn)?;
    }
    Ok(())
}

impl<'c> OrganizationDao<'c> {
    pub async fn list_detailed(&self) -> Result<Vec<model::Organization>> {
        use schema::organizations::dsl;

        readonly_transaction(self.pool, "organization_list", |conn| {
            let rows: Vec<Organization> = dsl::organizations.order(dsl::id.desc()).load(conn)?;
            rows.into_iter()
                .map(|row| load_detailed(conn, row))
                .collect()
        })
        .await
    }

    pub async fn get_detailed(&self, organization_id: i32) -> Result<model::Organization> {
        use schema::organizations::dsl;

        readonly_transaction(self.pool, "organization_get", move |conn| {
            let row: Organization = dsl::organizations
                .filter(dsl::id.eq(organization_id))
                .first(conn)
                .optional()?
                .ok_or_else(not_found)?;
            load_detailed(conn, row)
        })
        .await
    }

    pub async fn create(
        &self,
        name: String,
        phone_numbers: Vec<String>,
        building_id: i32,
        activities: Vec<i32>,
    ) -> Result<model::Organization> {
        use schema::organizations::dsl;

        do_with_transaction(self.pool, "organization_create", move |conn| {
            let now = Utc::now().naive_utc();
            diesel::insert_into(dsl::organizations)
                .values(NewOrganization {
                    name,
                    phone_numbers: serde_json::to_string(&phone_numbers).unwrap(),
                    building_id,
                    created_at: now,
                    updated_at: now,
                })
                .execute(conn)?;
            let organization_id: i32 = diesel::select(last_insert_rowid).first(conn)?;

            replace_activity_links(conn, organization_id, &activities)?;

            let row: Organization = dsl::organizations
                .filter(dsl::id.eq(organization_id))
                .first(conn)?;
            load_detailed(conn, row)
        })
        .await
    }

    /// Partial update. A present `activities` set replaces the whole link set.
    pub async fn update(
        &self,
        organization_id: i32,
        name: Option<String>,
        phone_numbers: Option<Vec<String>>,
        building_id: Option<i32>,
        activities: Option<Vec<i32>>,
    ) -> Result<model::Organization> {
        use schema::organizations::dsl;

        do_with_transaction(self.pool, "organization_update", move |conn| {
            let row: Organization = dsl::organizations
                .filter(dsl::id.eq(organization_id))
                .first(conn)
                .optional()?
                .ok_or_else(not_found)?;

            let phone_numbers = match phone_numbers {
                Some(numbers) => serde_json::to_string(&numbers).unwrap(),
                None => row.phone_numbers.clone(),
            };
            diesel::update(dsl::organizations.filter(dsl::id.eq(organization_id)))
                .set((
                    dsl::name.eq(name.unwrap_or(row.name)),
                    dsl::phone_numbers.eq(phone_numbers),
                    dsl::building_id.eq(building_id.unwrap_or(row.building_id)),
                    dsl::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;

            if let Some(ids) = activities {
                replace_activity_links(conn, organization_id, &ids)?;
            }

            let row: Organization = dsl::organizations
                .filter(dsl::id.eq(organization_id))
                .first(conn)?;
            load_detailed(conn, row)
        })
        .await
    }

    pub async fn delete(&self, organization_id: i32) -> Result<()> {
        use schema::organizations::dsl;

        do_with_transaction(self.pool, "organization_delete", move |conn| {
            let deleted =
                diesel::delete(dsl::organizations.filter(dsl::id.eq(organization_id)))
                    .execute(conn)?;
            if deleted == 0 {
                return Err(not_found());
            }
            Ok(())
        })
        .await
    }

    pub async fn by_building(&self, building_id: i32) -> Result<Vec<Organization>> {
        use diesel::dsl::exists;
        use schema::organizations::dsl;

        readonly_transaction(self.pool, "organization_by_building", move |conn| {
            let present: bool = diesel::select(exists(
                schema::buildings::dsl::buildings
                    .filter(schema::buildings::dsl::id.eq(building_id)),
            ))
            .get_result(conn)?;
            if !present {
                return Err(DaoError::NotFound("Building not found".to_string()));
            }
            Ok(dsl::organizations
                .filter(dsl::building_id.eq(building_id))
                .load(conn)?)
        })
        .await
    }

    pub async fn by_activity_exact(&self, activity_id: i32) -> Result<Vec<Organization>> {
        use diesel::dsl::exists;

        readonly_transaction(self.pool, "organization_by_activity", move |conn| {
            let present: bool = diesel::select(exists(
                schema::activities::dsl::activities
                    .filter(schema::activities::dsl::id.eq(activity_id)),
            ))
            .get_result(conn)?;
            if !present {
                return Err(DaoError::NotFound("Activity not found".to_string()));
            }
            linked_organizations(conn, vec![activity_id])
        })
        .await
    }

    /// Organizations linked to any of the given activity ids, each one once.
    pub async fn by_activity_ids(&self, activity_ids: HashSet<i32>) -> Result<Vec<Organization>> {
        let activity_ids: Vec<i32> = activity_ids.into_iter().collect();
        readonly_transaction(self.pool, "organization_by_activity_ids", move |conn| {
            linked_organizations(conn, activity_ids)
        })
        .await
    }

    pub async fn by_name_substring(
        &self,
        text: String,
    ) -> Result<Vec<(Organization, Building)>> {
        use schema::organizations::dsl;

        readonly_transaction(self.pool, "organization_by_name", move |conn| {
            let pattern = format!("%{}%", text);
            Ok(dsl::organizations
                .inner_join(schema::buildings::table)
                .filter(dsl::name.like(pattern))
                .load(conn)?)
        })
        .await
    }

    /// Great-circle filter over every organization's building. The radius is
    /// compared in meters; latitude/longitude are taken as-is, without the
    /// range checks building creation applies.
    pub async fn in_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<(Organization, Building)>> {
        use schema::organizations::dsl;

        readonly_transaction(self.pool, "organization_in_radius", move |conn| {
            let rows: Vec<(Organization, Building)> = dsl::organizations
                .inner_join(schema::buildings::table)
                .load(conn)?;
            let radius_m = radius_km * 1000.0;
            Ok(rows
                .into_iter()
                .filter(|(_, building)| {
                    geo::haversine_distance_m(
                        latitude,
                        longitude,
                        building.latitude,
                        building.longitude,
                    ) <= radius_m
                })
                .collect())
        })
        .await
    }
}

fn linked_organizations(conn: &ConnType, activity_ids: Vec<i32>) -> Result<Vec<Organization>> {
    use schema::organization_activity::dsl as link;
    use schema::organizations::dsl;

    let organization_ids: Vec<i32> = link::organization_activity
        .filter(link::activity_id.eq_any(activity_ids))
        .select(link::organization_id)
        .distinct()
        .load(conn)?;
    Ok(dsl::organizations
        .filter(dsl::id.eq_any(organization_ids))
        .load(conn)?)
}

use chrono::Utc;
use diesel::prelude::*;

use crate::db::dao::{last_insert_rowid, DaoError, Result};
use crate::db::executor::{do_with_transaction, readonly_transaction, AsDao, PoolType};
use crate::db::model::{Building, NewBuilding};
use crate::db::schema;

pub struct BuildingDao<'c> {
    pool: &'c PoolType,
}

impl<'a> AsDao<'a> for BuildingDao<'a> {
    fn as_dao(pool: &'a PoolType) -> Self {
        BuildingDao { pool }
    }
}

fn not_found() -> DaoError {
    DaoError::NotFound("Building not found".to_string())
}

impl<'c> BuildingDao<'c> {
    pub async fn list(&self) -> Result<Vec<Building>> {
        use schema::buildings::dsl;

        readonly_transaction(self.pool, "building_list", |conn| {
            Ok(dsl::buildings.order(dsl::id.desc()).load(conn)?)
        })
        .await
    }

    pub async fn get(&self, building_id: i32) -> Result<Building> {
        use schema::buildings::dsl;

        readonly_transaction(self.pool, "building_get", move |conn| {
            dsl::buildings
                .filter(dsl::id.eq(building_id))
                .first(conn)
                .optional()?
                .ok_or_else(not_found)
        })
        .await
    }

    pub async fn exists(&self, building_id: i32) -> Result<bool> {
        use diesel::dsl::exists;
        use schema::buildings::dsl;

        readonly_transaction(self.pool, "building_exists", move |conn| {
            Ok(
                diesel::select(exists(dsl::buildings.filter(dsl::id.eq(building_id))))
                    .get_result(conn)?,
            )
        })
        .await
    }

    pub async fn create(&self, address: String, latitude: f64, longitude: f64) -> Result<Building> {
        use schema::buildings::dsl;

        do_with_transaction(self.pool, "building_create", move |conn| {
            let now = Utc::now().naive_utc();
            diesel::insert_into(dsl::buildings)
                .values(NewBuilding {
                    address,
                    latitude,
                    longitude,
                    created_at: now,
                    updated_at: now,
                })
                .execute(conn)?;
            let building_id: i32 = diesel::select(last_insert_rowid).first(conn)?;
            Ok(dsl::buildings
                .filter(dsl::id.eq(building_id))
                .first(conn)?)
        })
        .await
    }

    pub async fn update(
        &self,
        building_id: i32,
        address: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Building> {
        use schema::buildings::dsl;

        do_with_transaction(self.pool, "building_update", move |conn| {
            let building: Building = dsl::buildings
                .filter(dsl::id.eq(building_id))
                .first(conn)
                .optional()?
                .ok_or_else(not_found)?;

            diesel::update(dsl::buildings.filter(dsl::id.eq(building_id)))
                .set((
                    dsl::address.eq(address.unwrap_or(building.address)),
                    dsl::latitude.eq(latitude.unwrap_or(building.latitude)),
                    dsl::longitude.eq(longitude.unwrap_or(building.longitude)),
                    dsl::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;

            Ok(dsl::buildings
                .filter(dsl::id.eq(building_id))
                .first(conn)?)
        })
        .await
    }

    pub async fn delete(&self, building_id: i32) -> Result<()> {
        use schema::buildings::dsl;

        do_with_transaction(self.pool, "building_delete", move |conn| {
            let deleted =
                diesel::delete(dsl::buildings.filter(dsl::id.eq(building_id))).execute(conn)?;
            if deleted == 0 {
                return Err(not_found());
            }
            Ok(())
        })
        .await
    }
}

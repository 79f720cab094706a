use chrono::Utc;
use diesel::prelude::*;

use crate::db::dao::{last_insert_rowid, DaoError, Result};
use crate::db::executor::{do_with_transaction, readonly_transaction, AsDao, PoolType};
use crate::db::model::{Activity, NewActivity};
use crate::db::schema;

pub struct ActivityDao<'c> {
    pool: &'c PoolType,
}

impl<'a> AsDao<'a> for ActivityDao<'a> {
    fn as_dao(pool: &'a PoolType) -> Self {
        ActivityDao { pool }
    }
}

fn not_found() -> DaoError {
    DaoError::NotFound("Activity not found".to_string())
}

impl<'c> ActivityDao<'c> {
    pub async fn list(&self) -> Result<Vec<Activity>> {
        use schema::activities::dsl;

        readonly_transaction(self.pool, "activity_list", |conn| {
            Ok(dsl::activities.order(dsl::id.desc()).load(conn)?)
        })
        .await
    }

    pub async fn get(&self, activity_id: i32) -> Result<Activity> {
        use schema::activities::dsl;

        readonly_transaction(self.pool, "activity_get", move |conn| {
            dsl::activities
                .filter(dsl::id.eq(activity_id))
                .first(conn)
                .optional()?
                .ok_or_else(not_found)
        })
        .await
    }

    pub async fn children_of(&self, activity_id: i32) -> Result<Vec<Activity>> {
        use schema::activities::dsl;

        readonly_transaction(self.pool, "activity_children_of", move |conn| {
            Ok(dsl::activities
                .filter(dsl::parent_id.eq(activity_id))
                .order(dsl::id.asc())
                .load(conn)?)
        })
        .await
    }

    /// All (id, parent_id) pairs, enough to rebuild the whole forest in memory.
    pub async fn parent_links(&self) -> Result<Vec<(i32, Option<i32>)>> {
        use schema::activities::dsl;

        readonly_transaction(self.pool, "activity_parent_links", |conn| {
            Ok(dsl::activities
                .select((dsl::id, dsl::parent_id))
                .load(conn)?)
        })
        .await
    }

    /// Subset of `activity_ids` that does not exist in the store.
    pub async fn missing(&self, activity_ids: Vec<i32>) -> Result<Vec<i32>> {
        use schema::activities::dsl;

        readonly_transaction(self.pool, "activity_missing", move |conn| {
            let known: Vec<i32> = dsl::activities
                .filter(dsl::id.eq_any(activity_ids.clone()))
                .select(dsl::id)
                .load(conn)?;
            Ok(activity_ids
                .into_iter()
                .filter(|id| !known.contains(id))
                .collect())
        })
        .await
    }

    pub async fn create(&self, name: String, parent_id: Option<i32>) -> Result<Activity> {
        use schema::activities::dsl;

        do_with_transaction(self.pool, "activity_create", move |conn| {
            let now = Utc::now().naive_utc();
            diesel::insert_into(dsl::activities)
                .values(NewActivity {
                    name,
                    parent_id,
                    created_at: now,
                    updated_at: now,
                })
                .execute(conn)?;
            let activity_id: i32 = diesel::select(last_insert_rowid).first(conn)?;
            Ok(dsl::activities
                .filter(dsl::id.eq(activity_id))
                .first(conn)?)
        })
        .await
    }

    pub async fn update(
        &self,
        activity_id: i32,
        name: Option<String>,
        parent_id: Option<Option<i32>>,
    ) -> Result<Activity> {
        use schema::activities::dsl;

        do_with_transaction(self.pool, "activity_update", move |conn| {
            let activity: Activity = dsl::activities
                .filter(dsl::id.eq(activity_id))
                .first(conn)
                .optional()?
                .ok_or_else(not_found)?;

            diesel::update(dsl::activities.filter(dsl::id.eq(activity_id)))
                .set((
                    dsl::name.eq(name.unwrap_or(activity.name)),
                    dsl::parent_id.eq(parent_id.unwrap_or(activity.parent_id)),
                    dsl::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;

            Ok(dsl::activities
                .filter(dsl::id.eq(activity_id))
                .first(conn)?)
        })
        .await
    }

    /// Removal is refused while child activities still point at this node.
    pub async fn delete(&self, activity_id: i32) -> Result<()> {
        use diesel::dsl::exists;
        use schema::activities::dsl;

        do_with_transaction(self.pool, "activity_delete", move |conn| {
            let present: bool =
                diesel::select(exists(dsl::activities.filter(dsl::id.eq(activity_id))))
                    .get_result(conn)?;
            if !present {
                return Err(not_found());
            }

            let has_children: bool = diesel::select(exists(
                dsl::activities.filter(dsl::parent_id.eq(activity_id)),
            ))
            .get_result(conn)?;
            if has_children {
                return Err(DaoError::Conflict(
                    "Cannot delete an activity that still has child activities".to_string(),
                ));
            }

            diesel::delete(dsl::activities.filter(dsl::id.eq(activity_id))).execute(conn)?;
            Ok(())
        })
        .await
    }
}

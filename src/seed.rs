//! Demo data for manual poking at the API. Applied only to an empty store.

use crate::db::dao::{ActivityDao, BuildingDao, OrganizationDao};
use crate::db::executor::DbExecutor;

pub async fn apply(db: &DbExecutor) -> anyhow::Result<()> {
    let buildings = db.as_dao::<BuildingDao>();
    if !buildings.list().await?.is_empty() {
        log::info!("database is not empty, skipping demo seed");
        return Ok(());
    }

    let downtown = buildings
        .create("1 Tverskaya St, Moscow".to_string(), 55.7601, 37.6096)
        .await?;
    let riverside = buildings
        .create("12 Embankment Ave, Moscow".to_string(), 55.7469, 37.6296)
        .await?;
    let outskirts = buildings
        .create("3 Industrial Rd, Zelenograd".to_string(), 55.9825, 37.1814)
        .await?;

    let activities = db.as_dao::<ActivityDao>();
    let food = activities.create("Food".to_string(), None).await?;
    let meat = activities
        .create("Meat products".to_string(), Some(food.id))
        .await?;
    let dairy = activities
        .create("Dairy products".to_string(), Some(food.id))
        .await?;
    let cheese = activities
        .create("Cheese".to_string(), Some(dairy.id))
        .await?;
    let cars = activities.create("Cars".to_string(), None).await?;
    let parts = activities
        .create("Spare parts".to_string(), Some(cars.id))
        .await?;

    let organizations = db.as_dao::<OrganizationDao>();
    organizations
        .create(
            "Horns and Hooves LLC".to_string(),
            vec!["2-222-222".to_string(), "3-333-333".to_string()],
            downtown.id,
            vec![meat.id],
        )
        .await?;
    organizations
        .create(
            "Morning Dairy".to_string(),
            vec!["8-800-555-35-35".to_string()],
            riverside.id,
            vec![dairy.id, cheese.id],
        )
        .await?;
    organizations
        .create(
            "AutoParts Trading".to_string(),
            vec!["495-123-45-67".to_string()],
            outskirts.id,
            vec![parts.id],
        )
        .await?;

    log::info!("seeded demo data");
    Ok(())
}

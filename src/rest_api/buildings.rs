use actix_web::{web, HttpResponse, Responder, Scope};
use serde::Deserialize;

use crate::db::dao::BuildingDao;
use crate::db::executor::DbExecutor;
use crate::error::{Error, ValidationErrors};
use crate::rest_api::{PathId, MAX_NAME_LEN};

pub fn register_endpoints(scope: Scope) -> Scope {
    scope
        .service(list_buildings)
        .service(create_building)
        .service(get_building)
        .service(update_building)
        .service(delete_building)
}

#[derive(Deserialize)]
pub struct BuildingInput {
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn check_address(errors: &mut ValidationErrors, address: &str) {
    if address.chars().count() > MAX_NAME_LEN {
        errors.add(
            "address",
            format!("The address may not be greater than {} characters.", MAX_NAME_LEN),
        );
    }
}

fn check_latitude(errors: &mut ValidationErrors, latitude: f64) {
    if !(-90.0..=90.0).contains(&latitude) {
        errors.add("latitude", "The latitude must be between -90 and 90.");
    }
}

fn check_longitude(errors: &mut ValidationErrors, longitude: f64) {
    if !(-180.0..=180.0).contains(&longitude) {
        errors.add("longitude", "The longitude must be between -180 and 180.");
    }
}

#[actix_web::get("/buildings")]
async fn list_buildings(db: web::Data<DbExecutor>) -> Result<impl Responder, Error> {
    log::debug!("list buildings");
    let buildings = db.as_dao::<BuildingDao>().list().await?;
    Ok(web::Json(
        buildings
            .into_iter()
            .map(|row| row.into_client())
            .collect::<Vec<_>>(),
    ))
}

#[actix_web::post("/buildings")]
async fn create_building(
    db: web::Data<DbExecutor>,
    body: web::Json<BuildingInput>,
) -> Result<impl Responder, Error> {
    log::debug!("create building");
    let body = body.into_inner();

    let mut errors = ValidationErrors::default();
    match &body.address {
        Some(address) => check_address(&mut errors, address),
        None => errors.add("address", "The address field is required."),
    }
    match body.latitude {
        Some(latitude) => check_latitude(&mut errors, latitude),
        None => errors.add("latitude", "The latitude field is required."),
    }
    match body.longitude {
        Some(longitude) => check_longitude(&mut errors, longitude),
        None => errors.add("longitude", "The longitude field is required."),
    }
    errors.into_result()?;

    let building = db
        .as_dao::<BuildingDao>()
        .create(
            body.address.unwrap(),
            body.latitude.unwrap(),
            body.longitude.unwrap(),
        )
        .await?;
    Ok(HttpResponse::Created().json(building.into_client()))
}

#[actix_web::get("/buildings/{id}")]
async fn get_building(
    db: web::Data<DbExecutor>,
    path: web::Path<PathId>,
) -> Result<impl Responder, Error> {
    log::debug!("get building [{}]", path.id);
    let building = db.as_dao::<BuildingDao>().get(path.id).await?;
    Ok(web::Json(building.into_client()))
}

#[actix_web::put("/buildings/{id}")]
async fn update_building(
    db: web::Data<DbExecutor>,
    path: web::Path<PathId>,
    body: web::Json<BuildingInput>,
) -> Result<impl Responder, Error> {
    log::debug!("update building [{}]", path.id);
    let body = body.into_inner();

    let mut errors = ValidationErrors::default();
    if let Some(address) = &body.address {
        check_address(&mut errors, address);
    }
    if let Some(latitude) = body.latitude {
        check_latitude(&mut errors, latitude);
    }
    if let Some(longitude) = body.longitude {
        check_longitude(&mut errors, longitude);
    }
    errors.into_result()?;

    let building = db
        .as_dao::<BuildingDao>()
        .update(path.id, body.address, body.latitude, body.longitude)
        .await?;
    Ok(web::Json(building.into_client()))
}

#[actix_web::delete("/buildings/{id}")]
async fn delete_building(
    db: web::Data<DbExecutor>,
    path: web::Path<PathId>,
) -> Result<impl Responder, Error> {
    log::debug!("delete building [{}]", path.id);
    db.as_dao::<BuildingDao>().delete(path.id).await?;
    Ok(web::Json(serde_json::json!({ "message": "Building deleted" })))
}

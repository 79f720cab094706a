use actix_web::{web, HttpResponse, Responder, Scope};
use serde::Deserialize;

use crate::db::dao::{ActivityDao, BuildingDao, OrganizationDao};
use crate::db::executor::DbExecutor;
use crate::error::{Error, ValidationErrors};
use crate::locator::{OrganizationLocator, DEFAULT_SEARCH_DEPTH};
use crate::rest_api::{PathActivityId, PathBuildingId, PathId, PathName, MAX_NAME_LEN};

pub fn register_endpoints(scope: Scope) -> Scope {
    // literal segments ahead of the `{id}` routes so path matching never
    // swallows them
    scope
        .service(list_organizations)
        .service(create_organization)
        .service(organizations_by_building)
        .service(organizations_by_activity)
        .service(organizations_in_radius)
        .service(search_by_activity_limited)
        .service(search_by_activity)
        .service(search_by_name)
        .service(get_organization)
        .service(update_organization)
        .service(delete_organization)
}

#[derive(Deserialize)]
pub struct OrganizationInput {
    pub name: Option<String>,
    pub phone_numbers: Option<Vec<String>>,
    pub building_id: Option<i32>,
    pub activities: Option<Vec<i32>>,
}

#[derive(Deserialize)]
pub struct RadiusQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
}

fn check_name(errors: &mut ValidationErrors, name: &str) {
    if name.chars().count() > MAX_NAME_LEN {
        errors.add(
            "name",
            format!("The name may not be greater than {} characters.", MAX_NAME_LEN),
        );
    }
}

async fn check_references(
    db: &DbExecutor,
    errors: &mut ValidationErrors,
    building_id: Option<i32>,
    activities: Option<&Vec<i32>>,
) -> Result<(), Error> {
    if let Some(building_id) = building_id {
        if !db.as_dao::<BuildingDao>().exists(building_id).await? {
            errors.add("building_id", "The selected building_id is invalid.");
        }
    }
    if let Some(ids) = activities {
        for id in db.as_dao::<ActivityDao>().missing(ids.clone()).await? {
            errors.add("activities", format!("The selected activity {} is invalid.", id));
        }
    }
    Ok(())
}

#[actix_web::get("/organizations")]
async fn list_organizations(db: web::Data<DbExecutor>) -> Result<impl Responder, Error> {
    log::debug!("list organizations");
    let organizations = db.as_dao::<OrganizationDao>().list_detailed().await?;
    Ok(web::Json(organizations))
}

#[actix_web::post("/organizations")]
async fn create_organization(
    db: web::Data<DbExecutor>,
    body: web::Json<OrganizationInput>,
) -> Result<impl Responder, Error> {
    log::debug!("create organization");
    let body = body.into_inner();

    let mut errors = ValidationErrors::default();
    match &body.name {
        Some(name) => check_name(&mut errors, name),
        None => errors.add("name", "The name field is required."),
    }
    if body.phone_numbers.is_none() {
        errors.add("phone_numbers", "The phone_numbers field is required.");
    }
    if body.building_id.is_none() {
        errors.add("building_id", "The building_id field is required.");
    }
    if body.activities.is_none() {
        errors.add("activities", "The activities field is required.");
    }
    check_references(&db, &mut errors, body.building_id, body.activities.as_ref()).await?;
    errors.into_result()?;

    let organization = db
        .as_dao::<OrganizationDao>()
        .create(
            body.name.unwrap(),
            body.phone_numbers.unwrap(),
            body.building_id.unwrap(),
            body.activities.unwrap(),
        )
        .await?;
    Ok(HttpResponse::Created().json(organization))
}

#[actix_web::get("/organizations/building/{building_id}")]
async fn organizations_by_building(
    db: web::Data<DbExecutor>,
    path: web::Path<PathBuildingId>,
) -> Result<impl Responder, Error> {
    log::debug!("organizations by building [{}]", path.building_id);
    let organizations = OrganizationLocator::new(db.get_ref().clone())
        .by_building(path.building_id)
        .await?;
    Ok(web::Json(organizations))
}

#[actix_web::get("/organizations/activity/{activity_id}")]
async fn organizations_by_activity(
    db: web::Data<DbExecutor>,
    path: web::Path<PathActivityId>,
) -> Result<impl Responder, Error> {
    log::debug!("organizations by activity [{}]", path.activity_id);
    let organizations = OrganizationLocator::new(db.get_ref().clone())
        .by_activity_exact(path.activity_id)
        .await?;
    Ok(web::Json(organizations))
}

#[actix_web::post("/organizations/radius")]
async fn organizations_in_radius(
    db: web::Data<DbExecutor>,
    body: web::Json<RadiusQuery>,
) -> Result<impl Responder, Error> {
    log::debug!("organizations in radius");
    let body = body.into_inner();

    let mut errors = ValidationErrors::default();
    if body.latitude.is_none() {
        errors.add("latitude", "The latitude field is required.");
    }
    if body.longitude.is_none() {
        errors.add("longitude", "The longitude field is required.");
    }
    if body.radius.is_none() {
        errors.add("radius", "The radius field is required.");
    }
    errors.into_result()?;

    // no coordinate range checks here; the search accepts what it is given
    let organizations = OrganizationLocator::new(db.get_ref().clone())
        .in_radius(
            body.latitude.unwrap(),
            body.longitude.unwrap(),
            body.radius.unwrap(),
        )
        .await?;
    Ok(web::Json(organizations))
}

#[actix_web::get("/organizations/search/activity/limited/{activity_id}")]
async fn search_by_activity_limited(
    db: web::Data<DbExecutor>,
    path: web::Path<PathActivityId>,
) -> Result<impl Responder, Error> {
    log::debug!("search organizations by activity (limited) [{}]", path.activity_id);
    let organizations = OrganizationLocator::new(db.get_ref().clone())
        .by_activity_recursive_limited(path.activity_id, DEFAULT_SEARCH_DEPTH)
        .await?;
    Ok(web::Json(organizations))
}

#[actix_web::get("/organizations/search/activity/{activity_id}")]
async fn search_by_activity(
    db: web::Data<DbExecutor>,
    path: web::Path<PathActivityId>,
) -> Result<impl Responder, Error> {
    log::debug!("search organizations by activity [{}]", path.activity_id);
    let organizations = OrganizationLocator::new(db.get_ref().clone())
        .by_activity_recursive(path.activity_id)
        .await?;
    Ok(web::Json(organizations))
}

#[actix_web::get("/organizations/search/name/{name}")]
async fn search_by_name(
    db: web::Data<DbExecutor>,
    path: web::Path<PathName>,
) -> Result<impl Responder, Error> {
    log::debug!("search organizations by name [{}]", path.name);
    let organizations = OrganizationLocator::new(db.get_ref().clone())
        .by_name_substring(path.name.clone())
        .await?;
    Ok(web::Json(organizations))
}

#[actix_web::get("/organizations/{id}")]
async fn get_organization(
    db: web::Data<DbExecutor>,
    path: web::Path<PathId>,
) -> Result<impl Responder, Error> {
    log::debug!("get organization [{}]", path.id);
    let organization = db.as_dao::<OrganizationDao>().get_detailed(path.id).await?;
    Ok(web::Json(organization))
}

#[actix_web::put("/organizations/{id}")]
async fn update_organization(
    db: web::Data<DbExecutor>,
    path: web::Path<PathId>,
    body: web::Json<OrganizationInput>,
) -> Result<impl Responder, Error> {
    log::debug!("update organization [{}]", path.id);
    let body = body.into_inner();

    let mut errors = ValidationErrors::default();
    if let Some(name) = &body.name {
        check_name(&mut errors, name);
    }
    check_references(&db, &mut errors, body.building_id, body.activities.as_ref()).await?;
    errors.into_result()?;

    let organization = db
        .as_dao::<OrganizationDao>()
        .update(
            path.id,
            body.name,
            body.phone_numbers,
            body.building_id,
            body.activities,
        )
        .await?;
    Ok(web::Json(organization))
}

#[actix_web::delete("/organizations/{id}")]
async fn delete_organization(
    db: web::Data<DbExecutor>,
    path: web::Path<PathId>,
) -> Result<impl Responder, Error> {
    log::debug!("delete organization [{}]", path.id);
    db.as_dao::<OrganizationDao>().delete(path.id).await?;
    Ok(web::Json(serde_json::json!({ "message": "Organization deleted" })))
}

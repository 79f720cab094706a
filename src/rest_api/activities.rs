use actix_web::{web, HttpResponse, Responder, Scope};
use serde::Deserialize;

use crate::db::dao::ActivityDao;
use crate::db::executor::DbExecutor;
use crate::db::model::Activity;
use crate::error::{Error, ValidationErrors};
use crate::rest_api::{double_option, PathId, MAX_NAME_LEN};

pub fn register_endpoints(scope: Scope) -> Scope {
    scope
        .service(list_activities)
        .service(create_activity)
        .service(get_activity)
        .service(update_activity)
        .service(delete_activity)
}

#[derive(Deserialize)]
pub struct CreateActivity {
    pub name: Option<String>,
    pub parent_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateActivity {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<i32>>,
}

fn check_name(errors: &mut ValidationErrors, name: &str) {
    if name.chars().count() > MAX_NAME_LEN {
        errors.add(
            "name",
            format!("The name may not be greater than {} characters.", MAX_NAME_LEN),
        );
    }
}

async fn check_parent(
    dao: &ActivityDao<'_>,
    errors: &mut ValidationErrors,
    parent_id: i32,
) -> Result<(), Error> {
    if !dao.missing(vec![parent_id]).await?.is_empty() {
        errors.add("parent_id", "The selected parent_id is invalid.");
    }
    Ok(())
}

#[actix_web::get("/activities")]
async fn list_activities(db: web::Data<DbExecutor>) -> Result<impl Responder, Error> {
    log::debug!("list activities");
    let rows = db.as_dao::<ActivityDao>().list().await?;

    // each entry carries one level of children, as the index always did
    let list: Vec<_> = rows
        .iter()
        .map(|activity| {
            let children: Vec<Activity> = rows
                .iter()
                .filter(|child| child.parent_id == Some(activity.id))
                .cloned()
                .collect();
            activity.clone().into_client_with_children(children)
        })
        .collect();
    Ok(web::Json(list))
}

#[actix_web::post("/activities")]
async fn create_activity(
    db: web::Data<DbExecutor>,
    body: web::Json<CreateActivity>,
) -> Result<impl Responder, Error> {
    log::debug!("create activity");
    let body = body.into_inner();
    let dao = db.as_dao::<ActivityDao>();

    let mut errors = ValidationErrors::default();
    match &body.name {
        Some(name) => check_name(&mut errors, name),
        None => errors.add("name", "The name field is required."),
    }
    if let Some(parent_id) = body.parent_id {
        check_parent(&dao, &mut errors, parent_id).await?;
    }
    errors.into_result()?;

    let activity = dao.create(body.name.unwrap(), body.parent_id).await?;
    Ok(HttpResponse::Created().json(activity.into_client()))
}

#[actix_web::get("/activities/{id}")]
async fn get_activity(
    db: web::Data<DbExecutor>,
    path: web::Path<PathId>,
) -> Result<impl Responder, Error> {
    log::debug!("get activity [{}]", path.id);
    let dao = db.as_dao::<ActivityDao>();
    let activity = dao.get(path.id).await?;
    let children = dao.children_of(path.id).await?;
    Ok(web::Json(activity.into_client_with_children(children)))
}

#[actix_web::put("/activities/{id}")]
async fn update_activity(
    db: web::Data<DbExecutor>,
    path: web::Path<PathId>,
    body: web::Json<UpdateActivity>,
) -> Result<impl Responder, Error> {
    log::debug!("update activity [{}]", path.id);
    let body = body.into_inner();
    let dao = db.as_dao::<ActivityDao>();

    let mut errors = ValidationErrors::default();
    if let Some(name) = &body.name {
        check_name(&mut errors, name);
    }
    if let Some(Some(parent_id)) = body.parent_id {
        check_parent(&dao, &mut errors, parent_id).await?;
    }
    errors.into_result()?;

    let activity = dao.update(path.id, body.name, body.parent_id).await?;
    Ok(web::Json(activity.into_client()))
}

#[actix_web::delete("/activities/{id}")]
async fn delete_activity(
    db: web::Data<DbExecutor>,
    path: web::Path<PathId>,
) -> Result<impl Responder, Error> {
    log::debug!("delete activity [{}]", path.id);
    db.as_dao::<ActivityDao>().delete(path.id).await?;
    Ok(web::Json(serde_json::json!({ "message": "Activity deleted" })))
}

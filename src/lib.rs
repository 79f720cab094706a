//! Directory of organizations, the buildings they occupy and a forest-shaped
//! taxonomy of business activities, served as an HTTP/JSON API over SQLite.

#[macro_use]
extern crate diesel;

pub mod db;
pub mod error;
pub mod geo;
pub mod hierarchy;
pub mod locator;
pub mod model;
pub mod rest_api;
pub mod seed;

use actix_web::web::Data;
use actix_web::Scope;

use crate::db::executor::DbExecutor;
use crate::rest_api::ExtendableScope;

pub const DIRECTORY_API_PATH: &str = "/api";

pub fn web_scope(db: &DbExecutor) -> Scope {
    actix_web::web::scope(DIRECTORY_API_PATH)
        .app_data(Data::new(db.clone()))
        .app_data(rest_api::path_config())
        .app_data(rest_api::json_config())
        .extend(rest_api::organizations::register_endpoints)
        .extend(rest_api::buildings::register_endpoints)
        .extend(rest_api::activities::register_endpoints)
}

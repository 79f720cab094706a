//! HTTP surface of the directory, mounted under [`crate::DIRECTORY_API_PATH`].

use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::web::{JsonConfig, PathConfig};
use serde::{Deserialize, Deserializer};

use crate::model::ErrorMessage;

pub mod activities;
pub mod buildings;
pub mod organizations;

pub const MAX_NAME_LEN: usize = 255;

pub trait ExtendableScope {
    fn extend<F>(self, f: F) -> Self
    where
        Self: Sized,
        F: FnOnce(Self) -> Self;
}

impl ExtendableScope for actix_web::Scope {
    fn extend<F>(self, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        f(self)
    }
}

/// Malformed path segments (e.g. a non-numeric id) come back as a 400 with
/// the standard message body.
pub fn path_config() -> PathConfig {
    PathConfig::default().error_handler(|err, _req| {
        InternalError::new(
            serde_json::to_string(&ErrorMessage::new(err.to_string())).unwrap(),
            StatusCode::BAD_REQUEST,
        )
        .into()
    })
}

pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _req| {
        InternalError::new(
            serde_json::to_string(&ErrorMessage::new(err.to_string())).unwrap(),
            StatusCode::BAD_REQUEST,
        )
        .into()
    })
}

#[derive(Deserialize)]
pub struct PathId {
    pub id: i32,
}

#[derive(Deserialize)]
pub struct PathBuildingId {
    pub building_id: i32,
}

#[derive(Deserialize)]
pub struct PathActivityId {
    pub activity_id: i32,
}

#[derive(Deserialize)]
pub struct PathName {
    pub name: String,
}

/// Distinguishes an absent field from an explicit `null` in PATCH-style
/// bodies: absent stays `None`, `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

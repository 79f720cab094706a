use std::collections::BTreeMap;

use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::db::dao::DaoError;
use crate::model::ErrorMessage;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Validation failed")]
    Validation(ValidationErrors),
    #[error("DB connection error: {0}")]
    Db(#[from] r2d2::Error),
    #[error("DAO error: {0}")]
    Dao(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<DaoError> for Error {
    fn from(e: DaoError) -> Self {
        match e {
            DaoError::NotFound(message) => Error::NotFound(message),
            DaoError::Conflict(message) => Error::Conflict(message),
            e => Error::Dao(e.to_string()),
        }
    }
}

impl actix_web::error::ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        match self {
            Error::NotFound(message) => HttpResponse::NotFound().json(ErrorMessage::new(message)),
            Error::Conflict(message) => {
                HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
            }
            Error::Validation(errors) => HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Validation failed",
                "errors": errors,
            })),
            _ => HttpResponse::InternalServerError().json(ErrorMessage::new(self.to_string())),
        }
    }
}

/// Field-level validation failures, keyed by request field name.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationErrors {
    #[serde(flatten)]
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl ToString) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Turns collected failures into the 400 response, or passes through.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

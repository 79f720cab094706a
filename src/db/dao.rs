mod activity;
mod building;
mod organization;

pub use activity::ActivityDao;
pub use building::BuildingDao;
pub use organization::OrganizationDao;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DaoError>;

no_arg_sql_function!(last_insert_rowid, diesel::sql_types::Integer);

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Diesel error: {0}")]
    DieselError(String),
    #[error("Tokio error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
    #[error("R2D2 error: {0}")]
    R2D2Error(#[from] r2d2::Error),
}

impl From<diesel::result::Error> for DaoError {
    fn from(error: diesel::result::Error) -> Self {
        match &error {
            diesel::result::Error::NotFound => DaoError::NotFound("Not found".to_string()),
            _ => DaoError::DieselError(format!("{:?}", error)),
        }
    }
}

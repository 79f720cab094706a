pub mod dao;
pub mod executor;
pub mod model;
pub mod schema;

pub mod migrations {
    #[derive(diesel_migrations::EmbedMigrations)]
    struct _Dummy;
}

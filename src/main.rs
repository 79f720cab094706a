use actix_web::{middleware, App, HttpServer};
use structopt::StructOpt;

use org_directory::db::executor::DbExecutor;
use org_directory::db::migrations;
use org_directory::{seed, web_scope};

#[derive(StructOpt)]
#[structopt(name = "org-directory", about = "Organization directory HTTP service")]
struct Args {
    /// SQLite database path
    #[structopt(long, env = "ORG_DIRECTORY_DB_URL", default_value = "org-directory.db")]
    db_url: String,
    /// HTTP listen address
    #[structopt(long, env = "ORG_DIRECTORY_API_ADDR", default_value = "127.0.0.1:8080")]
    api_addr: String,
    /// Populate an empty database with demo data
    #[structopt(long)]
    seed: bool,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::from_args();
    let db = DbExecutor::new(args.db_url.clone())?;
    db.apply_migration(migrations::run_with_output)?;

    if args.seed {
        seed::apply(&db).await?;
    }

    log::info!("listening on {}", args.api_addr);
    let web_db = db.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .service(web_scope(&web_db))
    })
    .bind(&args.api_addr)?
    .run()
    .await?;
    Ok(())
}

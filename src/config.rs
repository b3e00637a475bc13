mod database;
mod refine;
pub mod log;

use crate::config::database::Database;
use config;
use diesel::r2d2::ConnectionManager;
use diesel::PgConnection;
use r2d2::Pool;
use serde::Deserialize;
use std::env;

pub use crate::config::refine::Refine;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    db: Database,
    refine: Refine,
    logger: log::Config,
}

impl AppConfig {
    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn refine(&self) -> &Refine {
        &self.refine
    }

    pub fn logger(&self) -> &log::Config {
        &self.logger
    }
}

/// Loads `.env` (or `.env.{RUN_MODE}`) into the process environment. Secrets
/// like `OPENAI_API_KEY` travel this way rather than through config files.
pub fn load_dotenv() {
    let env_filename = env::var("RUN_MODE")
        .map(|env| format!(".env.{}", env))
        .unwrap_or_else(|_| ".env".into());

    dotenvy::from_filename(env_filename).ok();
}

pub fn load_config() -> Result<AppConfig, config::ConfigError> {
    let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    let config = config::Config::builder()
        .add_source(config::File::with_name(&format!("config/{}.json", env)))
        .build()?;

    config.try_deserialize()
}

pub fn connect_to_database(db: &Database) -> Pool<ConnectionManager<PgConnection>> {
    let database_url = format!(
        "postgres://{}:{}@{}:{}/{}",
        db.username(),
        db.password(),
        db.host(),
        db.port(),
        db.dbname()
    );
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    Pool::builder()
        .test_on_check_out(true)
        .build(manager)
        .expect("Could not build connection pool")
}

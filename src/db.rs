use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::auth::repo::PgAuthRepository;
use crate::config::AppConfig;
use crate::mail;
use crate::state::AppState;
use crate::users::repo::PgUserRepository;

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")
}

impl AppState {
    /// Production wiring: Postgres repositories plus the configured mailer.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = connect(&config).await?;
        migrate(&db).await?;

        let mailer = mail::from_config(&config.mail);
        Ok(Self::from_parts(
            config,
            Arc::new(PgAuthRepository::new(db.clone())),
            Arc::new(PgUserRepository::new(db)),
            mailer,
        ))
    }
}

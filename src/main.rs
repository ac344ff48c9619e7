#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod extract;
mod model;
mod openapi;
mod route;
mod store;
mod telemetry;


use std::{process::ExitCode, sync::Arc};

use sqlx::postgres::PgPoolOptions;

use crate::{
	config::{AdminConfig, Config, ConfigError},
	store::{MemoryStore, PgStore},
};

pub type Database = Arc<dyn store::Store>;
pub type Site = Arc<AdminConfig>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as the store and the admin site settings.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub site: Site,
}

/// Failures that stop the service before it accepts requests.
#[derive(Debug, thiserror::Error)]
enum StartupError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error("failed to connect to database: {0}")]
	Database(#[from] sqlx::Error),
	#[error("failed to run migrations: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
	#[error("failed to serve: {0}")]
	Io(#[from] std::io::Error),
}

async fn database(config: &Config) -> Result<Database, StartupError> {
	let Some(url) = &config.database_url else {
		tracing::warn!("DATABASE_URL is not set, content is kept in memory only");

		return Ok(Arc::new(MemoryStore::new()));
	};

	let pool = PgPoolOptions::new()
		.max_connections(config.max_connections)
		.connect(url)
		.await?;

	sqlx::migrate!().run(&pool).await?;

	Ok(Arc::new(PgStore::new(pool)))
}

async fn run() -> Result<(), StartupError> {
	let config = Config::from_env()?;
	let state = State {
		database: database(&config).await?,
		site: Arc::new(config.admin.clone()),
	};

	let app = route::app(state, &config.admin.path);
	let listener = tokio::net::TcpListener::bind((config.host, config.port)).await?;

	tracing::info!(
		address = %listener.local_addr()?,
		admin = %config.admin.path.prefix(),
		"listening"
	);

	axum::serve(listener, app).await?;

	Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
	dotenvy::dotenv().ok();
	let _guard = telemetry::init();

	match run().await {
		Ok(()) => ExitCode::SUCCESS,
		Err(error) => {
			tracing::error!(%error, "failed to start");
			ExitCode::FAILURE
		}
	}
}

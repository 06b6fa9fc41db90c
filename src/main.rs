use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::info;

use wallet_engine::api::{create_router, AppState};
use wallet_engine::cache::BalanceCache;
use wallet_engine::config::Settings;
use wallet_engine::models::{Account, AccountType, SYSTEM_FUNDING_ACCOUNT_ID};
use wallet_engine::observability::{init_logging, init_metrics, HealthChecker, LogConfig, LogFormat};
use wallet_engine::repositories::AccountRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::new()?;

    let log_config = LogConfig {
        level: settings.application.log_level.clone(),
        format: LogFormat::from(settings.application.log_format.as_str()),
        include_target: true,
        include_file: false,
        include_line: false,
    };
    init_logging(&log_config);

    let metrics_handle = init_metrics();
    info!("Configuration loaded, metrics initialized");

    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(settings.database.pool_size)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.database.url)
        .await?;
    info!("Database connection established");

    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations applied successfully");

    info!("Connecting to Redis...");
    let redis_client = redis::Client::open(settings.cache.redis_url.clone())?;
    let mut con = redis_client.get_multiplexed_async_connection().await?;
    let _: () = redis::cmd("PING").query_async(&mut con).await?;
    info!("Redis connection established");

    ensure_system_funding_account(&pool).await?;

    let cache = if settings.cache.enabled {
        Some(Arc::new(BalanceCache::new(redis_client.clone(), settings.cache.clone())))
    } else {
        None
    };

    let health_checker = Arc::new(HealthChecker::new(pool.clone(), redis_client.clone()));

    let state = AppState::new(pool, redis_client, cache)
        .with_metrics(metrics_handle)
        .with_health_checker(health_checker);

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", settings.application.port);
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Creates the fixed SystemFunding account on first boot (SPEC_FULL.md §3.1,
/// §9 "Global mutable state"). A uniqueness conflict from a concurrent
/// instance doing the same is treated as success.
async fn ensure_system_funding_account(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let repo = AccountRepository::new(pool.clone());
    if repo.find_by_id(SYSTEM_FUNDING_ACCOUNT_ID).await?.is_some() {
        return Ok(());
    }

    let mut account = Account::new("XXX", AccountType::System);
    account.id = SYSTEM_FUNDING_ACCOUNT_ID;

    match repo.create(&account).await {
        Ok(_) => {
            info!("SystemFunding account created");
            Ok(())
        }
        Err(wallet_engine::error::AppError::Database(sqlx::Error::Database(e))) if e.is_unique_violation() => {
            info!("SystemFunding account already created by a concurrent instance");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

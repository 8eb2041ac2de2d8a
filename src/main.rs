//! Profile Assignment service entry point.
//!
//! Wires configuration, stores, the HTTP API, and (when Redis is configured)
//! the drift consumer, then serves until ctrl-c or SIGTERM.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use profile_assignment::adapters::behavior::HttpBehaviorSource;
use profile_assignment::adapters::events::{DriftConsumer, DriftConsumerConfig};
use profile_assignment::adapters::http::{app_router, AppState};
use profile_assignment::adapters::memory::{
    InMemoryAccountStore, InMemoryAssignmentPublisher, InMemoryProfileCatalog,
    InMemoryRankingStateRepository,
};
use profile_assignment::adapters::postgres::{
    self, PostgresAccountStore, PostgresProfileCatalog, PostgresRankingStateRepository,
};
use profile_assignment::adapters::redis::{self as redis_streams, RedisAssignmentPublisher, RedisDriftEventLog};
use profile_assignment::application::{AssignProfileHandler, HandleDriftEventHandler};
use profile_assignment::config::AppConfig;
use profile_assignment::ports::{
    AccountStore, AssignmentPublisher, ProfileCatalog, RankingStateRepository,
};
use profile_assignment::telemetry;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

struct Stores {
    catalog: Arc<dyn ProfileCatalog>,
    rankings: Arc<dyn RankingStateRepository>,
    accounts: Arc<dyn AccountStore>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;
    telemetry::init(&config.server)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting profile assignment service"
    );

    let stores = build_stores(&config).await?;

    let publisher: Arc<dyn AssignmentPublisher> = match &config.redis {
        Some(redis) => Arc::new(RedisAssignmentPublisher::new(
            redis,
            config.streams.assigned_stream.clone(),
        )?),
        None => {
            warn!("No Redis configured, assignment events are kept in memory");
            Arc::new(InMemoryAssignmentPublisher::new())
        }
    };

    let policy = config.assignment.policy();
    let mut state = AppState::new(
        stores.catalog.clone(),
        stores.rankings.clone(),
        stores.accounts.clone(),
        publisher.clone(),
        policy,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut consumer_task: Option<JoinHandle<()>> = None;

    if let (true, Some(redis)) = (config.consumer_enabled(), &config.redis) {
        let conn = redis_streams::connect(redis).await?;
        let log = Arc::new(RedisDriftEventLog::new(conn, &config.streams));
        let behaviors = Arc::new(HttpBehaviorSource::new(&config.behavior_service)?);
        let assigner = Arc::new(AssignProfileHandler::new(
            stores.catalog.clone(),
            stores.rankings.clone(),
            stores.accounts.clone(),
            publisher.clone(),
            policy,
        ));
        let handler = Arc::new(HandleDriftEventHandler::new(
            behaviors,
            assigner,
            config.behavior_service.recent_limit,
        ));
        let consumer = DriftConsumer::with_config(
            log,
            handler,
            DriftConsumerConfig::from(&config.streams),
        );
        state = state.with_consumer_flag(consumer.running_flag());

        info!(
            stream = %config.streams.drift_stream,
            group = %config.streams.consumer_group,
            consumer = %config.streams.consumer_name,
            "Starting drift consumer"
        );
        consumer_task = Some(tokio::spawn(async move {
            if let Err(e) = consumer.run(shutdown_rx).await {
                error!(error = %e, "Drift consumer failed to start");
            }
        }));
    } else {
        info!("Drift consumer disabled");
    }

    let app = app_router(state, &config.server);
    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    if let Some(task) = consumer_task {
        if let Err(e) = task.await {
            error!(error = %e, "Drift consumer task panicked");
        }
    }

    info!("Shutdown complete");
    Ok(())
}

async fn build_stores(config: &AppConfig) -> Result<Stores, BoxError> {
    let seeded = match &config.assignment.catalog_seed_path {
        Some(path) => {
            let catalog = InMemoryProfileCatalog::from_yaml_file(path)?;
            info!(path = %path, profiles = catalog.profile_count(), "Loaded catalog seed");
            Some(catalog)
        }
        None => None,
    };

    match &config.database {
        Some(database) => {
            let pool = postgres::connect(database).await?;
            info!("Connected to PostgreSQL");
            if let Some(path) = &config.assignment.account_seed_path {
                warn!(path = %path, "Account seed ignored, accounts are read from PostgreSQL");
            }
            let catalog: Arc<dyn ProfileCatalog> = match seeded {
                Some(catalog) => Arc::new(catalog),
                None => Arc::new(PostgresProfileCatalog::new(pool.clone())),
            };
            Ok(Stores {
                catalog,
                rankings: Arc::new(PostgresRankingStateRepository::new(pool.clone())),
                accounts: Arc::new(PostgresAccountStore::new(pool)),
            })
        }
        None => {
            warn!("No database configured, using in-memory stores");
            let catalog = seeded.unwrap_or_else(|| {
                warn!("No catalog seed configured, every assignment will stay PENDING");
                InMemoryProfileCatalog::with_profiles(Vec::new())
            });
            let accounts = match &config.assignment.account_seed_path {
                Some(path) => {
                    let accounts = InMemoryAccountStore::from_yaml_file(path)?;
                    info!(path = %path, accounts = accounts.account_count(), "Loaded account seed");
                    accounts
                }
                None => {
                    warn!(
                        "No account seed configured, every user is unknown: assign returns \
                         USER_NOT_FOUND and status returns NOT_FOUND"
                    );
                    InMemoryAccountStore::new()
                }
            };
            Ok(Stores {
                catalog: Arc::new(catalog),
                rankings: Arc::new(InMemoryRankingStateRepository::new()),
                accounts: Arc::new(accounts),
            })
        }
    }
}

async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);
}

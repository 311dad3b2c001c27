use std::{future::IntoFuture, process, sync::Arc};

use annonces::{
    application::{
        error::AppError,
        listings::ListingService,
        repos::{ListingsRepo, ListingsWriteRepo},
    },
    cache::{CacheConfig, TtlCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::migration(err.to_string())))?;
    info!(target = "annonces::migrate", "migrations applied");
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::migration(err.to_string())))?;

    let repositories = Arc::new(PostgresRepositories::new(pool));
    let reader: Arc<dyn ListingsRepo> = repositories.clone();
    let writer: Arc<dyn ListingsWriteRepo> = repositories.clone();

    let cache = Arc::new(TtlCache::new());
    let listings = Arc::new(ListingService::new(
        reader,
        writer,
        cache,
        CacheConfig::from(&settings.cache),
        settings.search,
    ));

    let state = ApiState {
        listings,
        health: repositories,
    };

    serve_http(&settings, state).await
}

async fn connect_pool(settings: &config::Settings) -> Result<sqlx::PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "annonces::serve",
        addr = %settings.server.addr,
        "listening"
    );

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = stop_rx.await;
        })
        .into_future();
    let mut server = tokio::spawn(server);

    tokio::select! {
        joined = &mut server => return server_outcome(joined),
        _ = shutdown_signal() => {}
    }

    info!(
        target = "annonces::serve",
        timeout_secs = settings.server.graceful_shutdown.as_secs(),
        "shutdown requested, draining connections"
    );
    let _ = stop_tx.send(());

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(joined) => server_outcome(joined),
        Err(_) => {
            warn!(
                target = "annonces::serve",
                "graceful shutdown timed out, aborting in-flight requests"
            );
            server.abort();
            Ok(())
        }
    }
}

fn server_outcome(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "annonces::serve", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(target = "annonces::serve", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

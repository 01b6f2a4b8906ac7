use around_api::{
    config::Env,
    lexicon::LexiconLoadError,
    server::{self, ServerState},
};
use around_common::spam::LexiconHandle;
use around_db::{
    client::{BoardClient, BoardError},
    elastic::{ElasticBuildError, ElasticStore},
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error loading spam lexicon: {0}")]
    Lexicon(#[from] LexiconLoadError),
    #[error("Error creating store client: {0}")]
    Store(#[from] ElasticBuildError),
    #[error("Error preparing the post index: {0}")]
    Bootstrap(#[from] BoardError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "around_api=debug,\
                around_common=debug,\
                around_db=debug,\
                tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

/// Cancels `shutdown` on Ctrl-C, or SIGTERM on unix.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutting down");
    shutdown.cancel();
}

#[cfg(unix)]
fn spawn_lexicon_reload(env: &Env, lexicon: &Arc<LexiconHandle>, shutdown: &CancellationToken) {
    if let Some(path) = env.spam_lexicon_path.clone() {
        tokio::spawn(around_api::lexicon::reload_on_hangup(
            Arc::clone(lexicon),
            path,
            shutdown.clone(),
        ));
    }
}

#[cfg(not(unix))]
fn spawn_lexicon_reload(_env: &Env, _lexicon: &Arc<LexiconHandle>, _shutdown: &CancellationToken) {}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let lexicon = Arc::new(LexiconHandle::new(env.load_lexicon()?));
    info!(size = lexicon.snapshot().len(), "Loaded spam lexicon");

    let store = ElasticStore::new(&env.store_url)?;
    let board = BoardClient::new(Arc::new(store))
        .with_index(env.store_index.clone())
        .with_max_hits(env.search_max_hits);
    board.bootstrap().await?;

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    spawn_lexicon_reload(&env, &lexicon, &shutdown);

    let state = ServerState {
        board: Arc::new(board),
        lexicon,
    };

    let tracing_layer = TraceLayer::new_for_http();
    let app = server::routes().with_state(state).layer(tracing_layer);

    let listener = tokio::net::TcpListener::bind(env.socket_address())
        .await
        .map_err(InitError::TcpBind)?;
    info!(address = %env.socket_address(), "Started service");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}

use std::convert::Infallible;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Response, StatusCode, header};
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpListener;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::Semaphore;

// Error tracing
use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use http::HeaderValue;
use http_body_util::combinators::BoxBody;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use shared::config::{LiveConfig, load_config, load_or_default};

use server::AppState;
use server::database::{cleanup_expired_sessions, open_database};
use server::handlers::utils::{ClientAddr, full};
use server::mailer::LogMailer;
use server::router::{Router, build_router};
use server::sealer::Sealer;
use server::security::LoginGuard;

/// Food-review API server.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let app_config = load_or_default(&args.config).context("Failed to load configuration")?;

    // Validation guarantees the key resolves; the cipher is derived once, so
    // rotating the key requires a restart.
    let secret = app_config
        .auth
        .resolved_secret_key()
        .context("Sealing key missing")?;
    let sealer = Arc::new(Sealer::new(&secret)?);

    let guard = LoginGuard::new(
        app_config.auth.max_login_failures,
        app_config.auth.failure_window_secs,
    );
    for cidr in &app_config.security.blocked_networks {
        let net = cidr
            .parse()
            .with_context(|| format!("Invalid blocked network {:?} in config", cidr))?;
        guard.block_network(net).await;
    }

    let db = open_database(&app_config.storage.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", app_config.storage.db_path))?;

    let removed = cleanup_expired_sessions(&db).await?;
    if removed > 0 {
        info!("Swept {} expired sessions at startup", removed);
    }

    let addr = app_config.server.addr();
    let max_connections = app_config.server.max_connections;

    let state = AppState {
        db,
        config: LiveConfig::new(app_config),
        guard,
        sealer,
        mailer: Arc::new(LogMailer),
    };

    spawn_reload_task(state.config.clone(), args.config.clone(), state.guard.clone());

    let router = Arc::new(build_router());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    serve(listener, router, state, max_connections).await
}

/// Accept loop: one spawned task per connection, HTTP/1 on top.
///
/// Concurrent connections are capped at `max_connections`; the permit is
/// held until the connection closes, so further accepts wait their turn.
async fn serve(
    listener: TcpListener,
    router: Arc<Router>,
    state: AppState,
    max_connections: usize,
) -> Result<()> {
    let permits = Arc::new(Semaphore::new(max_connections));

    loop {
        let permit = permits
            .clone()
            .acquire_owned()
            .await
            .context("Connection semaphore closed")?;

        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Accept failed: {}", e);
                continue;
            }
        };

        let io = TokioIo::new(stream);
        let state = state.clone();
        let router = router.clone();

        tokio::task::spawn(async move {
            let _permit = permit;
            let peer_ip = peer.ip();

            let service = service_fn(move |mut req| {
                let state = state.clone();
                let router = router.clone();
                async move {
                    // Stash the peer address so handlers can fall back to it
                    // when no proxy headers are present.
                    req.extensions_mut().insert(ClientAddr(peer_ip));
                    match router.route(req, state).await {
                        Ok(response) => Ok::<_, Infallible>(response),
                        Err(e) => {
                            error!("Handler failed: {:#}", e);
                            Ok(internal_error_response())
                        }
                    }
                }
            });

            if let Err(err) = http1::Builder::new()
                .timer(TokioTimer::new())
                .serve_connection(io, service)
                .await
            {
                warn!("Error serving connection from {}: {:?}", peer_ip, err);
            }
        });
    }
}

/// Last-resort response when a handler returns `Err`.  Static body, nothing
/// left to fail.
fn internal_error_response() -> Response<BoxBody<Bytes, Infallible>> {
    let mut response = Response::new(full(
        r#"{"status":"error","code":"INTERNAL_ERROR","message":"Internal server error"}"#,
    ));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Re-read the config file on SIGHUP and swap it into the live handle.
///
/// Only values read through `state.config` pick up the change (session and
/// activation expiries, mail addresses).  The bind address, pool, sealing
/// key and login-guard thresholds are fixed at startup.
fn spawn_reload_task(config: LiveConfig, path: String, guard: LoginGuard) {
    tokio::spawn(async move {
        let mut hup = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("SIGHUP handler unavailable, hot-reload disabled: {}", e);
                return;
            }
        };

        while hup.recv().await.is_some() {
            info!("SIGHUP received, reloading {}", path);
            match load_config(&path) {
                Ok(new_config) => {
                    config.reload(new_config).await;
                    guard.prune().await;
                    let stats = guard.stats().await;
                    info!(
                        "Configuration reloaded; login guard tracking {} addresses, {} denied, {} static networks",
                        stats.tracked_ips, stats.blocked_now, stats.blocked_networks
                    );
                }
                Err(e) => {
                    error!("Reload failed, keeping the running config: {}", e);
                }
            }
        }
    });
}

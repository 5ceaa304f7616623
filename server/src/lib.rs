//! Food-review platform server.
//!
//! Route dispatch lives in [`router`], request handlers under [`handlers`],
//! persistence under [`database`].  [`sealer`] produces the tamper-proof
//! activation and removal tickets that ride in emailed links, and
//! [`security`] tracks failed logins per source IP.

pub mod database;
pub mod handlers;
pub mod mailer;
pub mod router;
pub mod sealer;
pub mod security;

use std::sync::Arc;

use shared::config::LiveConfig;
use sqlx::SqlitePool;

use crate::mailer::Mailer;
use crate::sealer::Sealer;
use crate::security::LoginGuard;

/// Shared server context handed to every request handler.
///
/// Cloning is cheap: the pool and guard are handle types and the rest
/// are `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: LiveConfig,
    pub guard: LoginGuard,
    pub sealer: Arc<Sealer>,
    pub mailer: Arc<dyn Mailer + Send + Sync>,
}

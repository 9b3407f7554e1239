use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use cinedex_core::query::Criteria;

use crate::infra::app_state::AppState;

const RATE_LIMIT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Work run once the state is built and before the listener accepts
/// connections.
#[async_trait]
pub trait StartupHooks: Send + Sync {
    async fn run(&self, state: &AppState) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct ProdStartupHooks;

#[async_trait]
impl StartupHooks for ProdStartupHooks {
    async fn run(&self, state: &AppState) -> Result<()> {
        let total_movies = state.movies.count(&Criteria::default()).await?;
        let total_users = state.users.count(&Criteria::default()).await?;
        info!(total_movies, total_users, "catalog ready");
        if total_users == 0 {
            info!(
                "No accounts yet; the first registration becomes the \
                 administrator"
            );
        }

        if state.config.rate_limit.enabled {
            let limiter = state.rate_limiter.clone();
            tokio::spawn(async move {
                let mut interval =
                    tokio::time::interval(RATE_LIMIT_SWEEP_INTERVAL);
                loop {
                    interval.tick().await;
                    let purged = limiter.purge_expired();
                    if purged > 0 {
                        debug!(
                            purged,
                            remaining = limiter.tracked_clients(),
                            "expired rate limit windows dropped"
                        );
                    }
                }
            });
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NoopStartupHooks;

#[async_trait]
impl StartupHooks for NoopStartupHooks {
    async fn run(&self, _state: &AppState) -> Result<()> {
        Ok(())
    }
}

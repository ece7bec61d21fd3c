// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Background job that deletes expired login sessions.

use std::{sync::Arc, time::Duration};

use stage_server_db::{DbError, SessionStore};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// How often expired sessions are purged.
pub const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// One cleanup pass. Returns the number of deleted sessions.
#[instrument(skip(sessions), fields(job_id = "session-cleanup"))]
pub async fn cleanup_expired_sessions(sessions: &dyn SessionStore) -> Result<u64, DbError> {
	let deleted = sessions.delete_expired_sessions().await?;
	if deleted > 0 {
		info!(deleted_count = deleted, "expired sessions deleted");
	}
	Ok(deleted)
}

/// Run [`cleanup_expired_sessions`] every `period` until the handle is aborted.
/// A failed pass is logged and retried on the next tick.
pub fn spawn_session_cleanup(sessions: Arc<dyn SessionStore>, period: Duration) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(period);
		ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
		loop {
			ticker.tick().await;
			if let Err(e) = cleanup_expired_sessions(sessions.as_ref()).await {
				warn!(error = %e, "session cleanup failed");
			}
		}
	})
}

// src/download/throttle.rs
// =============================================================================
// Minimum delay between successive downloads.
//
// One Throttle is shared (Arc) by every download worker, so the interval
// bounds the total request rate to the server, not the rate per worker.
// The mutex is held while sleeping: callers queue up and go one at a time.
//
// Not a rate limiter: no bursts, no token bucket.
// =============================================================================

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_turn: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_turn: Mutex::new(None),
        }
    }

    // Returns once at least `interval` has passed since the previous turn.
    // The first turn never waits.
    pub async fn wait_turn(&self) {
        let mut last_turn = self.last_turn.lock().await;

        if let Some(last) = *last_turn {
            let ready_at = last + self.interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last_turn = Some(Instant::now());
    }
}

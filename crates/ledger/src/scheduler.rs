//! Maturity scheduler
//!
//! Fires the maturity sweep once a day at a fixed UTC hour. Firings are
//! single-flight: a firing that is still running when the next one is
//! due makes the next one wait, it never overlaps.

use crate::fixed_deposit::FixedDepositEngine;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

pub struct MaturityScheduler {
    engine: FixedDepositEngine,
    fire_hour: u32,
    gate: Mutex<()>,
}

impl MaturityScheduler {
    /// `fire_hour` is the UTC hour of day (0-23) the sweep runs at.
    pub fn new(engine: FixedDepositEngine, fire_hour: u32) -> Self {
        debug_assert!(fire_hour < 24);
        Self {
            engine,
            fire_hour,
            gate: Mutex::new(()),
        }
    }

    /// The next instant at or after `now` that lands on `fire_hour`.
    fn next_firing(now: DateTime<Utc>, fire_hour: u32) -> DateTime<Utc> {
        let today = now
            .date_naive()
            .and_hms_opt(fire_hour, 0, 0)
            .expect("valid hour of day");
        let today = DateTime::from_naive_utc_and_offset(today, Utc);
        if today > now {
            today
        } else {
            today + ChronoDuration::days(1)
        }
    }

    /// Run one sweep now. Concurrent callers queue behind the gate, so
    /// two firings never interleave.
    pub async fn fire(&self) {
        let _flight = self.gate.lock().await;
        tracing::info!("maturity sweep firing");
        match self.engine.process_matured_fixed_deposits().await {
            Ok(outcome) if outcome.failures.is_empty() => {
                tracing::info!(processed = outcome.processed, "maturity sweep done");
            }
            Ok(outcome) => {
                tracing::warn!(
                    processed = outcome.processed,
                    failed = outcome.failures.len(),
                    "maturity sweep finished with failures"
                );
            }
            Err(error) => {
                tracing::error!(%error, "maturity sweep could not run");
            }
        }
    }

    /// Sleep until the firing hour, sweep, repeat.
    pub async fn run(self: Arc<Self>) {
        loop {
            let now = Utc::now();
            let next = Self::next_firing(now, self.fire_hour);
            let wait = (next - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            tracing::debug!(next = %next, "maturity sweep scheduled");
            tokio::time::sleep(wait).await;
            self.fire().await;
        }
    }

    /// Spawn the daily loop on the current runtime.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

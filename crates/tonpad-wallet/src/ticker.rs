//! Background TON/USD price polling.
//!
//! One spawned task fetches a quote immediately, then once per period.
//! A failed fetch keeps the previous quote and is only logged. Stopping or
//! dropping the ticker aborts the task. Quotes are published under a stop
//! gate, so once `stop` returns no further quote reaches subscribers or the
//! update callback, even on a multi-threaded runtime.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use tonpad_core::traits::PriceSource;

use crate::state::PriceQuote;

/// Default polling period.
pub const DEFAULT_PRICE_PERIOD: Duration = Duration::from_secs(60);

/// Shortest accepted polling period. Shorter periods are raised to it.
pub const MIN_PRICE_PERIOD: Duration = Duration::from_secs(1);

/// Handle to a running price poller.
pub struct PriceTicker {
    handle: JoinHandle<()>,
    quote: watch::Receiver<PriceQuote>,
    /// `true` once stopped. Held while a quote is published.
    stopped: Arc<Mutex<bool>>,
}

impl PriceTicker {
    /// Start polling `source` every `period`. `on_update` runs after each
    /// successful fetch with the new quote. `period` is raised to
    /// [`MIN_PRICE_PERIOD`] if shorter.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn<F>(source: Arc<dyn PriceSource>, period: Duration, on_update: F) -> Self
    where
        F: Fn(PriceQuote) + Send + Sync + 'static,
    {
        if period < MIN_PRICE_PERIOD {
            warn!(period_ms = period.as_millis() as u64, "price period too short, using minimum");
        }
        let period = period.max(MIN_PRICE_PERIOD);
        let (tx, rx) = watch::channel(PriceQuote::default());
        let stopped = Arc::new(Mutex::new(false));
        let gate = Arc::clone(&stopped);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match source.usd_price().await {
                    Ok(price) => {
                        let quote = PriceQuote {
                            usd_per_unit: Some(price),
                            fetched_at: Some(Utc::now()),
                        };
                        let stopped = gate.lock();
                        if *stopped {
                            break;
                        }
                        debug!(price, "price updated");
                        tx.send_replace(quote);
                        on_update(quote);
                    }
                    Err(e) => warn!(error = %e, "failed to fetch TON price"),
                }
            }
        });
        Self {
            handle,
            quote: rx,
            stopped,
        }
    }

    /// Last successfully fetched quote.
    pub fn latest(&self) -> PriceQuote {
        *self.quote.borrow()
    }

    /// A receiver that observes every new quote.
    pub fn subscribe(&self) -> watch::Receiver<PriceQuote> {
        self.quote.clone()
    }

    /// Cancel polling. No quote is published after this returns.
    ///
    /// Must not be called from inside the update callback.
    pub fn stop(&self) {
        *self.stopped.lock() = true;
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for PriceTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

//! The wallet session: form state plus the operations behind its buttons.
//!
//! The state lock is only taken between awaits. Each operation marks itself
//! in flight under the lock before doing any I/O, so a second request of the
//! same kind is rejected with [`WalletError::Busy`] instead of racing.
//! The mark is held by an [`InFlight`] guard, so an operation whose future
//! is dropped (timeout, `select!`, task abort) releases it as well.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};
use zeroize::Zeroizing;

use tonpad_client::Providers;
use tonpad_core::constants::{DEFAULT_TRANSFER_COMMENT, SEND_MODE_PAY_GAS_SEPARATELY};
use tonpad_core::traits::PriceSource;

use crate::error::{Operation, WalletError};
use crate::resolver::{AddressResolver, ResolvedWallet};
use crate::state::{Event, ViewState};
use crate::ticker::{DEFAULT_PRICE_PERIOD, PriceTicker};
use crate::transfer::{TransferOutcome, TransferSubmitter};

/// Session settings that are not provider wiring.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Text comment attached to every transfer.
    pub transfer_comment: String,
    /// Send mode byte for the outgoing message.
    pub send_mode: u8,
    /// Price polling period.
    pub price_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            transfer_comment: DEFAULT_TRANSFER_COMMENT.to_string(),
            send_mode: SEND_MODE_PAY_GAS_SEPARATELY,
            price_period: DEFAULT_PRICE_PERIOD,
        }
    }
}

/// One open wallet form.
pub struct Session {
    state: Arc<Mutex<ViewState>>,
    resolver: AddressResolver,
    submitter: TransferSubmitter,
    prices: Arc<dyn PriceSource>,
    price_period: Duration,
    ticker: Mutex<Option<PriceTicker>>,
}

impl Session {
    pub fn new(providers: &Providers, config: &SessionConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(ViewState::new())),
            resolver: AddressResolver::new(providers),
            submitter: TransferSubmitter::new(
                providers,
                &config.transfer_comment,
                config.send_mode,
            ),
            prices: Arc::clone(&providers.prices),
            price_period: config.price_period,
            ticker: Mutex::new(None),
        }
    }

    /// A copy of the current state for rendering.
    pub fn snapshot(&self) -> ViewState {
        self.state.lock().clone()
    }

    /// Apply an input event (typing into a field).
    pub fn dispatch(&self, event: Event) {
        self.state.lock().apply(event);
    }

    pub fn set_mnemonic(&self, phrase: impl Into<String>) {
        self.dispatch(Event::MnemonicChanged(phrase.into()));
    }

    pub fn set_destination(&self, destination: impl Into<String>) {
        self.dispatch(Event::DestinationChanged(destination.into()));
    }

    pub fn set_amount(&self, amount: impl Into<String>) {
        self.dispatch(Event::AmountChanged(amount.into()));
    }

    /// Take the one-shot acknowledgement of the last successful transfer.
    pub fn take_notice(&self) -> Option<String> {
        self.state.lock().take_notice()
    }

    /// Resolve the current mnemonic into an address with balance and assets.
    pub async fn connect(&self) -> Result<ResolvedWallet, WalletError> {
        let (in_flight, phrase) = self.begin(Operation::Resolve, Event::ResolveStarted, |s| {
            Zeroizing::new(s.mnemonic.to_string())
        })?;

        let result = self.resolver.resolve(&phrase).await;

        in_flight.finish(match &result {
            Ok(wallet) => Event::Resolved(wallet.clone()),
            Err(e) => Event::ResolveFailed(e.clone()),
        });
        result
    }

    /// Send the pending amount to the pending destination.
    pub async fn send(&self) -> Result<TransferOutcome, WalletError> {
        let (in_flight, (phrase, destination, amount)) =
            self.begin(Operation::Submit, Event::SubmitStarted, |s| {
                (
                    Zeroizing::new(s.mnemonic.to_string()),
                    s.pending.destination_address.clone(),
                    s.pending.amount_string.clone(),
                )
            })?;

        let result = self.submitter.submit(&phrase, &destination, &amount).await;

        in_flight.finish(match &result {
            Ok(outcome) => Event::Submitted(outcome.clone()),
            Err(e) => Event::SubmitFailed(e.clone()),
        });
        result
    }

    /// Start polling the price into the view state. Replaces a running ticker.
    pub fn start_price_ticker(&self) {
        let state = Arc::clone(&self.state);
        let ticker = PriceTicker::spawn(Arc::clone(&self.prices), self.price_period, move |q| {
            state.lock().apply(Event::PriceUpdated(q));
        });
        info!(period_secs = self.price_period.as_secs(), "price ticker started");
        *self.ticker.lock() = Some(ticker);
    }

    /// Stop price polling. The last quote stays in the view state.
    pub fn stop_price_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().take() {
            ticker.stop();
            debug!("price ticker stopped");
        }
    }

    /// Mark `op` in flight and read what it needs, atomically.
    fn begin<T>(
        &self,
        op: Operation,
        started: Event,
        read: impl FnOnce(&ViewState) -> T,
    ) -> Result<(InFlight<'_>, T), WalletError> {
        let mut state = self.state.lock();
        if state.is_in_flight(op) {
            debug!(%op, "rejected while in flight");
            return Err(WalletError::Busy(op));
        }
        state.apply(started);
        let value = read(&state);
        drop(state);
        let in_flight = InFlight {
            state: &*self.state,
            op,
            done: false,
        };
        Ok((in_flight, value))
    }
}

/// An operation marked in flight. Dropped unfinished, it clears the mark.
struct InFlight<'a> {
    state: &'a Mutex<ViewState>,
    op: Operation,
    done: bool,
}

impl InFlight<'_> {
    /// Apply the completion event, which also clears the mark.
    fn finish(mut self, event: Event) {
        self.state.lock().apply(event);
        self.done = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.done {
            debug!(op = %self.op, "operation dropped before completion");
            self.state.lock().apply(Event::Cancelled(self.op));
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_price_ticker();
    }
}

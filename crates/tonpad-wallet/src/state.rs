//! View state of the wallet form and its reducer.
//!
//! Every change goes through [`ViewState::apply`], so the state can be
//! driven and checked in tests without any front end.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use tonpad_core::amount::nanotons_to_ton;
use tonpad_core::traits::AssetCounts;

use crate::error::{Operation, WalletError};
use crate::resolver::ResolvedWallet;
use crate::transfer::TransferOutcome;

/// Latest TON/USD quote.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceQuote {
    pub usd_per_unit: Option<f64>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// A resolved wallet as shown to the user. Lives only in memory.
#[derive(Clone)]
pub struct WalletSession {
    pub mnemonic_phrase: Zeroizing<String>,
    pub derived_address: String,
    pub balance_nanotons: u64,
    pub nft_count: u64,
    pub jetton_count: u64,
}

impl WalletSession {
    /// Balance in TON.
    pub fn balance(&self) -> f64 {
        nanotons_to_ton(self.balance_nanotons)
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("derived_address", &self.derived_address)
            .field("balance_nanotons", &self.balance_nanotons)
            .field("nft_count", &self.nft_count)
            .field("jetton_count", &self.jetton_count)
            .finish_non_exhaustive()
    }
}

/// Transfer inputs as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTransfer {
    pub destination_address: String,
    pub amount_string: String,
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Resolving,
    Resolved,
    Failed,
    Submitting,
    /// The last submit failed; any resolved wallet is still shown.
    SubmitFailed,
}

/// Everything that can happen to the form.
#[derive(Debug, Clone)]
pub enum Event {
    MnemonicChanged(String),
    DestinationChanged(String),
    AmountChanged(String),
    ResolveStarted,
    Resolved(ResolvedWallet),
    ResolveFailed(WalletError),
    SubmitStarted,
    Submitted(TransferOutcome),
    SubmitFailed(WalletError),
    /// The running operation was dropped before it finished.
    Cancelled(Operation),
    PriceUpdated(PriceQuote),
}

/// The whole form: inputs, resolved wallet, error line, price and notice.
#[derive(Clone, Default)]
pub struct ViewState {
    pub mnemonic: Zeroizing<String>,
    pub wallet: Option<WalletSession>,
    pub pending: PendingTransfer,
    pub error: Option<String>,
    pub price: PriceQuote,
    notice: Option<String>,
    settled: Phase,
    /// Phrase being resolved, captured when the resolve started.
    resolving: Option<Zeroizing<String>>,
    submitting: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event.
    pub fn apply(&mut self, event: Event) {
        match event {
            Event::MnemonicChanged(phrase) => self.mnemonic = Zeroizing::new(phrase),
            Event::DestinationChanged(dest) => self.pending.destination_address = dest,
            Event::AmountChanged(amount) => self.pending.amount_string = amount,
            Event::ResolveStarted => self.resolving = Some(self.mnemonic.clone()),
            Event::Resolved(resolved) => {
                let phrase = self
                    .resolving
                    .take()
                    .unwrap_or_else(|| self.mnemonic.clone());
                self.wallet = Some(WalletSession {
                    mnemonic_phrase: phrase,
                    derived_address: resolved.display_address,
                    balance_nanotons: resolved.balance_nanotons,
                    nft_count: resolved.assets.nfts,
                    jetton_count: resolved.assets.jettons,
                });
                self.error = None;
                self.settled = Phase::Resolved;
            }
            Event::ResolveFailed(err) => {
                self.resolving = None;
                self.wallet = None;
                self.error = Some(err.to_string());
                self.settled = Phase::Failed;
            }
            Event::SubmitStarted => self.submitting = true,
            Event::Submitted(outcome) => {
                self.submitting = false;
                if let Some(ack) = outcome.acknowledgement() {
                    self.pending = PendingTransfer::default();
                    self.notice = Some(ack);
                }
                self.settled = self.resting_phase();
            }
            Event::SubmitFailed(err) => {
                self.submitting = false;
                self.error = Some(err.to_string());
                self.settled = Phase::SubmitFailed;
            }
            Event::Cancelled(Operation::Resolve) => self.resolving = None,
            Event::Cancelled(Operation::Submit) => self.submitting = false,
            Event::PriceUpdated(quote) => {
                if quote.usd_per_unit.is_some() {
                    self.price = quote;
                }
            }
        }
    }

    /// Current phase. Running operations take precedence over the settled one.
    pub fn phase(&self) -> Phase {
        if self.resolving.is_some() {
            Phase::Resolving
        } else if self.submitting {
            Phase::Submitting
        } else {
            self.settled
        }
    }

    pub fn is_in_flight(&self, op: Operation) -> bool {
        match op {
            Operation::Resolve => self.resolving.is_some(),
            Operation::Submit => self.submitting,
        }
    }

    /// Take the acknowledgement of the last successful submit. Returns it once.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Displayed address, or empty when no wallet is resolved.
    pub fn address_display(&self) -> &str {
        self.wallet
            .as_ref()
            .map(|w| w.derived_address.as_str())
            .unwrap_or("")
    }

    /// Balance in TON, e.g. `0.05`.
    pub fn balance_display(&self) -> Option<String> {
        self.wallet.as_ref().map(|w| w.balance().to_string())
    }

    /// Balance times price, to 4 decimals.
    pub fn usd_value_display(&self) -> Option<String> {
        let balance = self.wallet.as_ref()?.balance();
        let price = self.price.usd_per_unit?;
        Some(format!("{:.4}", balance * price))
    }

    pub fn price_display(&self) -> Option<String> {
        self.price.usd_per_unit.map(|p| p.to_string())
    }

    pub fn asset_counts(&self) -> Option<AssetCounts> {
        self.wallet.as_ref().map(|w| AssetCounts {
            nfts: w.nft_count,
            jettons: w.jetton_count,
        })
    }

    fn resting_phase(&self) -> Phase {
        if self.wallet.is_some() {
            Phase::Resolved
        } else {
            Phase::Idle
        }
    }
}

impl fmt::Debug for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewState")
            .field("wallet", &self.wallet)
            .field("pending", &self.pending)
            .field("error", &self.error)
            .field("price", &self.price)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonpad_core::address::Address;

    fn resolved(balance: u64) -> ResolvedWallet {
        ResolvedWallet {
            address: Address::new(0, [1; 32]),
            display_address: "0QAB".into(),
            balance_nanotons: balance,
            assets: AssetCounts { nfts: 2, jettons: 3 },
        }
    }

    fn with_inputs() -> ViewState {
        let mut s = ViewState::new();
        s.apply(Event::MnemonicChanged("words".into()));
        s.apply(Event::DestinationChanged("EQdest".into()));
        s.apply(Event::AmountChanged("0.05".into()));
        s
    }

    #[test]
    fn resolve_success_populates_wallet() {
        let mut s = with_inputs();
        s.apply(Event::ResolveStarted);
        assert_eq!(s.phase(), Phase::Resolving);
        s.apply(Event::Resolved(resolved(50_000_000)));
        assert_eq!(s.phase(), Phase::Resolved);
        assert_eq!(s.address_display(), "0QAB");
        assert_eq!(s.balance_display().as_deref(), Some("0.05"));
        assert_eq!(s.asset_counts(), Some(AssetCounts { nfts: 2, jettons: 3 }));
        assert_eq!(s.wallet.as_ref().unwrap().mnemonic_phrase.as_str(), "words");
        assert!(s.error.is_none());
    }

    #[test]
    fn resolve_failure_rolls_back() {
        let mut s = with_inputs();
        s.apply(Event::Resolved(resolved(1)));
        s.apply(Event::ResolveStarted);
        s.apply(Event::ResolveFailed(WalletError::Fetch));
        assert_eq!(s.phase(), Phase::Failed);
        assert!(s.wallet.is_none());
        assert_eq!(s.address_display(), "");
        assert_eq!(s.balance_display(), None);
        assert_eq!(s.error.as_deref(), Some("Failed to fetch wallet details."));
    }

    #[test]
    fn successful_resolve_clears_error() {
        let mut s = with_inputs();
        s.apply(Event::ResolveFailed(WalletError::Derivation));
        s.apply(Event::Resolved(resolved(1)));
        assert!(s.error.is_none());
    }

    #[test]
    fn usd_value_rounds_to_four_places() {
        let mut s = with_inputs();
        s.apply(Event::Resolved(resolved(50_000_000)));
        assert_eq!(s.usd_value_display(), None);
        s.apply(Event::PriceUpdated(PriceQuote {
            usd_per_unit: Some(5.23),
            fetched_at: Some(Utc::now()),
        }));
        assert_eq!(s.price_display().as_deref(), Some("5.23"));
        assert_eq!(s.usd_value_display().as_deref(), Some("0.2615"));
    }

    #[test]
    fn empty_quote_keeps_last_price() {
        let mut s = ViewState::new();
        s.apply(Event::PriceUpdated(PriceQuote {
            usd_per_unit: Some(2.0),
            fetched_at: None,
        }));
        s.apply(Event::PriceUpdated(PriceQuote::default()));
        assert_eq!(s.price.usd_per_unit, Some(2.0));
    }

    #[test]
    fn sent_clears_inputs_and_notifies_once() {
        let mut s = with_inputs();
        s.apply(Event::Resolved(resolved(1)));
        s.apply(Event::SubmitStarted);
        assert_eq!(s.phase(), Phase::Submitting);
        s.apply(Event::Submitted(TransferOutcome::Sent {
            destination: "EQdest".into(),
            amount: "0.05".into(),
        }));
        assert_eq!(s.pending, PendingTransfer::default());
        assert_eq!(s.phase(), Phase::Resolved);
        assert_eq!(s.take_notice().as_deref(), Some("Sent 0.05 TON to EQdest"));
        assert_eq!(s.take_notice(), None);
    }

    #[test]
    fn sent_keeps_previous_error() {
        let mut s = with_inputs();
        s.apply(Event::SubmitFailed(WalletError::Transfer("x".into())));
        s.apply(Event::Submitted(TransferOutcome::Sent {
            destination: "d".into(),
            amount: "1".into(),
        }));
        assert_eq!(s.error.as_deref(), Some("Failed to send TON: x"));
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn not_deployed_changes_nothing_visible() {
        let mut s = with_inputs();
        s.apply(Event::Resolved(resolved(1)));
        let before_pending = s.pending.clone();
        s.apply(Event::SubmitStarted);
        s.apply(Event::Submitted(TransferOutcome::NotDeployed {
            address: "0QAB".into(),
        }));
        assert_eq!(s.pending, before_pending);
        assert!(s.error.is_none());
        assert_eq!(s.take_notice(), None);
        assert_eq!(s.phase(), Phase::Resolved);
    }

    #[test]
    fn submit_failure_keeps_wallet_and_inputs() {
        let mut s = with_inputs();
        s.apply(Event::Resolved(resolved(1)));
        s.apply(Event::SubmitStarted);
        s.apply(Event::SubmitFailed(WalletError::Transfer("boom".into())));
        assert_eq!(s.phase(), Phase::SubmitFailed);
        assert!(s.wallet.is_some());
        assert_eq!(s.pending.destination_address, "EQdest");
        assert_eq!(s.pending.amount_string, "0.05");
        assert_eq!(s.error.as_deref(), Some("Failed to send TON: boom"));
    }

    #[test]
    fn in_flight_flags_are_independent() {
        let mut s = ViewState::new();
        s.apply(Event::ResolveStarted);
        assert!(s.is_in_flight(Operation::Resolve));
        assert!(!s.is_in_flight(Operation::Submit));
        s.apply(Event::SubmitStarted);
        assert!(s.is_in_flight(Operation::Submit));
        s.apply(Event::ResolveFailed(WalletError::Derivation));
        assert!(!s.is_in_flight(Operation::Resolve));
        assert_eq!(s.phase(), Phase::Submitting);
    }

    #[test]
    fn resolved_wallet_keeps_phrase_it_was_resolved_from() {
        let mut s = with_inputs();
        s.apply(Event::ResolveStarted);
        s.apply(Event::MnemonicChanged("edited while pending".into()));
        s.apply(Event::Resolved(resolved(1)));
        assert_eq!(s.wallet.as_ref().unwrap().mnemonic_phrase.as_str(), "words");
        assert_eq!(s.mnemonic.as_str(), "edited while pending");
    }

    #[test]
    fn cancelled_clears_only_its_flag() {
        let mut s = with_inputs();
        s.apply(Event::Resolved(resolved(1)));
        s.apply(Event::ResolveStarted);
        s.apply(Event::SubmitStarted);
        s.apply(Event::Cancelled(Operation::Resolve));
        assert!(!s.is_in_flight(Operation::Resolve));
        assert_eq!(s.phase(), Phase::Submitting);
        s.apply(Event::Cancelled(Operation::Submit));
        assert_eq!(s.phase(), Phase::Resolved);
        assert!(s.wallet.is_some());
        assert!(s.error.is_none());
    }

    #[test]
    fn debug_hides_mnemonic() {
        let mut s = ViewState::new();
        s.apply(Event::MnemonicChanged("secret words".into()));
        s.apply(Event::Resolved(resolved(1)));
        assert!(!format!("{s:?}").contains("secret"));
    }
}

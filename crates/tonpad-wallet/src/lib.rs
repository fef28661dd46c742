//! # tonpad-wallet
//! The wallet form without a front end: resolve a mnemonic into an address
//! with balance and assets, send one transfer, and keep a TON/USD quote fresh.

pub mod error;
pub mod resolver;
pub mod session;
pub mod state;
pub mod ticker;
pub mod transfer;

pub use error::{Operation, WalletError};
pub use resolver::{AddressRenderings, AddressResolver, ResolvedWallet, derive_wallet};
pub use session::{Session, SessionConfig};
pub use state::{Event, PendingTransfer, Phase, PriceQuote, ViewState, WalletSession};
pub use ticker::PriceTicker;
pub use transfer::{TransferOutcome, TransferSubmitter};

//! Mnemonic to displayed wallet: address, balance and asset counts.

use std::sync::Arc;

use tracing::{debug, info, warn};

use tonpad_client::Providers;
use tonpad_core::address::{Address, FriendlyFormat, Network};
use tonpad_core::constants::BASECHAIN;
use tonpad_core::crypto::KeyPair;
use tonpad_core::error::MnemonicError;
use tonpad_core::mnemonic;
use tonpad_core::traits::{AssetCounts, AssetIndex, BalanceProvider};
use tonpad_core::wallet_v4::WalletV4;

use crate::error::WalletError;

/// Derive the key pair and wallet v4r2 contract for a phrase on the base
/// workchain.
pub fn derive_wallet(phrase: &str) -> Result<(KeyPair, WalletV4), MnemonicError> {
    let keypair = mnemonic::to_keypair(phrase)?;
    let wallet = WalletV4::new(keypair.public_key(), BASECHAIN);
    Ok((keypair, wallet))
}

/// The four user-friendly renderings of an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRenderings {
    pub bounceable_testnet: String,
    pub non_bounceable_testnet: String,
    pub bounceable_mainnet: String,
    pub non_bounceable_mainnet: String,
}

impl AddressRenderings {
    pub fn of(address: &Address) -> Self {
        let render = |bounceable, test_only| {
            address.to_friendly(FriendlyFormat {
                bounceable,
                test_only,
                url_safe: true,
            })
        };
        Self {
            bounceable_testnet: render(true, true),
            non_bounceable_testnet: render(false, true),
            bounceable_mainnet: render(true, false),
            non_bounceable_mainnet: render(false, false),
        }
    }
}

/// A wallet derived from a phrase together with its on-chain details.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWallet {
    pub address: Address,
    /// Non-bounceable, URL-safe rendering for the configured network.
    pub display_address: String,
    pub balance_nanotons: u64,
    pub assets: AssetCounts,
}

/// Turns a phrase into a [`ResolvedWallet`].
#[derive(Clone)]
pub struct AddressResolver {
    network: Network,
    balance: Arc<dyn BalanceProvider>,
    assets: Arc<dyn AssetIndex>,
}

impl AddressResolver {
    pub fn new(providers: &Providers) -> Self {
        Self {
            network: providers.network,
            balance: Arc::clone(&providers.balance),
            assets: Arc::clone(&providers.assets),
        }
    }

    /// Derive the address, then fetch its balance and asset counts.
    ///
    /// Derivation failures collapse into [`WalletError::Derivation`] and
    /// balance failures into [`WalletError::Fetch`]; causes go to the log.
    /// A failed asset lookup is logged and reported as zero counts.
    pub async fn resolve(&self, phrase: &str) -> Result<ResolvedWallet, WalletError> {
        let (_, wallet) = derive_wallet(phrase).map_err(|e| {
            debug!(error = %e, "mnemonic rejected");
            WalletError::Derivation
        })?;
        let address = *wallet.address();
        let display_address = address.to_friendly(FriendlyFormat::display_for(self.network));

        let balance_nanotons = self.balance.get_balance(&address).await.map_err(|e| {
            debug!(error = %e, address = %display_address, "balance lookup failed");
            WalletError::Fetch
        })?;
        let assets = match self.assets.asset_counts(&address).await {
            Ok(counts) => counts,
            Err(e) => {
                warn!(error = %e, address = %display_address, "asset lookup failed, showing zero");
                AssetCounts::default()
            }
        };

        info!(
            address = %display_address,
            balance = balance_nanotons,
            nfts = assets.nfts,
            jettons = assets.jettons,
            "wallet resolved"
        );
        Ok(ResolvedWallet {
            address,
            display_address,
            balance_nanotons,
            assets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon ability able about above absent absorb abstract absurd abuse \
        access accident account accuse achieve acid acoustic acquire across act action actor \
        absurd achieve";

    #[test]
    fn renderings_of_known_wallet() {
        let (_, wallet) = derive_wallet(PHRASE).unwrap();
        let r = AddressRenderings::of(wallet.address());
        assert_eq!(r.bounceable_testnet, "kQBd3aS19W0zWerqU0GpWPusYADm04KDTIrgKBnYqAoM6H0s");
        assert_eq!(r.non_bounceable_testnet, "0QBd3aS19W0zWerqU0GpWPusYADm04KDTIrgKBnYqAoM6CDp");
        assert_eq!(r.bounceable_mainnet, "EQBd3aS19W0zWerqU0GpWPusYADm04KDTIrgKBnYqAoM6Mam");
        assert_eq!(r.non_bounceable_mainnet, "UQBd3aS19W0zWerqU0GpWPusYADm04KDTIrgKBnYqAoM6Jtj");
    }

    #[test]
    fn derive_rejects_short_phrase() {
        assert!(derive_wallet("abandon").is_err());
    }
}

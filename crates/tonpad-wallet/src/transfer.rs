//! Single outbound TON transfer from a mnemonic-derived wallet.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use tonpad_client::Providers;
use tonpad_core::address::{Address, FriendlyFormat, Network};
use tonpad_core::amount::parse_ton;
use tonpad_core::boc;
use tonpad_core::message::InternalTransfer;
use tonpad_core::traits::{ChainConnector, EndpointResolver};
use tonpad_core::wallet_v4::valid_until;

use crate::error::WalletError;
use crate::resolver::derive_wallet;

/// How a submit ended when no error was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The endpoint accepted the external message. Not a confirmation.
    Sent { destination: String, amount: String },
    /// The source wallet has no deployed contract; nothing was sent.
    NotDeployed { address: String },
}

impl TransferOutcome {
    /// One-shot acknowledgement for the user, if any.
    pub fn acknowledgement(&self) -> Option<String> {
        match self {
            TransferOutcome::Sent {
                destination,
                amount,
            } => Some(format!("Sent {amount} TON to {destination}")),
            TransferOutcome::NotDeployed { .. } => None,
        }
    }
}

/// Builds, signs and submits wallet v4r2 transfers.
#[derive(Clone)]
pub struct TransferSubmitter {
    network: Network,
    endpoints: Arc<dyn EndpointResolver>,
    connector: Arc<dyn ChainConnector>,
    comment: String,
    send_mode: u8,
}

impl TransferSubmitter {
    pub fn new(providers: &Providers, comment: &str, send_mode: u8) -> Self {
        Self {
            network: providers.network,
            endpoints: Arc::clone(&providers.endpoints),
            connector: Arc::clone(&providers.connector),
            comment: comment.to_owned(),
            send_mode,
        }
    }

    /// Send `amount` TON to `destination`, attempting once.
    ///
    /// Returns [`TransferOutcome::NotDeployed`] without error when the source
    /// wallet is not active on chain. Every other failure, including a
    /// malformed destination or amount, becomes [`WalletError::Transfer`].
    pub async fn submit(
        &self,
        phrase: &str,
        destination: &str,
        amount: &str,
    ) -> Result<TransferOutcome, WalletError> {
        let fail = |cause: String| {
            debug!(%cause, "transfer failed");
            WalletError::Transfer(cause)
        };

        let (keypair, wallet) = derive_wallet(phrase).map_err(|e| fail(e.to_string()))?;
        let source = wallet
            .address()
            .to_friendly(FriendlyFormat::display_for(self.network));

        let endpoint = self
            .endpoints
            .resolve(self.network)
            .await
            .map_err(|e| fail(e.to_string()))?;
        let client = self.connector.connect(&endpoint);

        if !client
            .is_contract_deployed(wallet.address())
            .await
            .map_err(|e| fail(e.to_string()))?
        {
            info!(address = %source, "wallet is not deployed");
            return Ok(TransferOutcome::NotDeployed { address: source });
        }

        let seqno = client
            .get_seqno(wallet.address())
            .await
            .map_err(|e| fail(e.to_string()))?;

        let message = InternalTransfer {
            destination: Address::parse(destination).map_err(|e| fail(e.to_string()))?,
            value: parse_ton(amount).map_err(|e| fail(e.to_string()))?,
            bounce: false,
            comment: Some(self.comment.clone()),
        };
        let expires = valid_until(seqno, Utc::now().timestamp().max(0) as u64);
        let external = wallet
            .external_transfer(&keypair, seqno, expires, &[(self.send_mode, message)])
            .map_err(|e| fail(e.to_string()))?;

        client
            .send_boc(&boc::serialize(&external))
            .await
            .map_err(|e| fail(e.to_string()))?;

        let destination = destination.trim().to_string();
        let amount = amount.trim().to_string();
        info!(from = %source, to = %destination, %amount, seqno, %endpoint, "transfer submitted");
        Ok(TransferOutcome::Sent {
            destination,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acknowledgement_only_for_sent() {
        let sent = TransferOutcome::Sent {
            destination: "EQA4V9tF4lY2S_J-sEQR7aUj9IwW-Ou2vJQlCn--2DLOLR5e".into(),
            amount: "0.05".into(),
        };
        assert_eq!(
            sent.acknowledgement().as_deref(),
            Some("Sent 0.05 TON to EQA4V9tF4lY2S_J-sEQR7aUj9IwW-Ou2vJQlCn--2DLOLR5e")
        );
        let idle = TransferOutcome::NotDeployed {
            address: "0Q..".into(),
        };
        assert_eq!(idle.acknowledgement(), None);
    }
}

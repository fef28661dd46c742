//! The wallet v4r2 contract: address derivation and signed transfers.

use std::sync::Arc;

use crate::address::Address;
use crate::cell::{Cell, CellBuilder, CellDigest, representation_hash};
use crate::constants::{
    TRANSFER_TTL_SECS, WALLET_ID_BASE, WALLET_V4R2_CODE_DEPTH, WALLET_V4R2_CODE_HASH,
};
use crate::crypto::KeyPair;
use crate::error::CellError;
use crate::message::{InternalTransfer, external_message};

/// The wallet v4r2 contract for one public key on one workchain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletV4 {
    public_key: [u8; 32],
    workchain: i8,
    wallet_id: u32,
    address: Address,
}

impl WalletV4 {
    pub fn new(public_key: [u8; 32], workchain: i8) -> Self {
        let wallet_id = WALLET_ID_BASE.wrapping_add_signed(workchain as i32);
        let data = data_cell(&public_key, wallet_id);
        let address = Address::new(workchain, state_init_hash(&data));
        Self {
            public_key,
            workchain,
            wallet_id,
            address,
        }
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn workchain(&self) -> i8 {
        self.workchain
    }

    pub fn wallet_id(&self) -> u32 {
        self.wallet_id
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Initial persistent data: seqno 0, wallet id, public key, empty plugin
    /// dictionary.
    pub fn data_cell(&self) -> Cell {
        data_cell(&self.public_key, self.wallet_id)
    }

    /// Build the signed body of a transfer: `signature || signing_body`.
    ///
    /// Each message is sent with its own mode byte. The wallet accepts at
    /// most four messages per transfer.
    pub fn create_transfer(
        &self,
        keypair: &KeyPair,
        seqno: u32,
        valid_until: u32,
        messages: &[(u8, InternalTransfer)],
    ) -> Result<Cell, CellError> {
        let mut signing = CellBuilder::new();
        signing
            .store_uint(self.wallet_id as u128, 32)?
            .store_uint(valid_until as u128, 32)?
            .store_uint(seqno as u128, 32)?
            .store_uint(0, 8)?; // op: simple send
        for (mode, msg) in messages {
            signing.store_uint(*mode as u128, 8)?;
            signing.store_ref(Arc::new(msg.to_cell()?))?;
        }

        let signature = keypair.sign(&signing.clone().build().hash());
        let mut body = CellBuilder::new();
        body.store_bytes(&signature)?.store_builder(&signing)?;
        Ok(body.build())
    }

    /// Wrap a signed transfer body in an external message to this wallet.
    pub fn external_transfer(
        &self,
        keypair: &KeyPair,
        seqno: u32,
        valid_until: u32,
        messages: &[(u8, InternalTransfer)],
    ) -> Result<Cell, CellError> {
        let body = self.create_transfer(keypair, seqno, valid_until, messages)?;
        external_message(&self.address, Arc::new(body))
    }
}

/// Expiry for a transfer: never for the first one (seqno 0), otherwise
/// `now + 60` seconds.
pub fn valid_until(seqno: u32, now_unix: u64) -> u32 {
    if seqno == 0 {
        u32::MAX
    } else {
        (now_unix.saturating_add(TRANSFER_TTL_SECS as u64)).min(u32::MAX as u64) as u32
    }
}

fn data_cell(public_key: &[u8; 32], wallet_id: u32) -> Cell {
    let mut b = CellBuilder::new();
    b.store_uint(0, 32)
        .and_then(|b| b.store_uint(wallet_id as u128, 32))
        .and_then(|b| b.store_bytes(public_key))
        .and_then(|b| b.store_bit(false))
        .expect("wallet data is 321 bits");
    b.build()
}

/// Hash of `StateInit { code, data }` with the code known only by digest.
fn state_init_hash(data: &Cell) -> [u8; 32] {
    let code = CellDigest {
        hash: WALLET_V4R2_CODE_HASH,
        depth: WALLET_V4R2_CODE_DEPTH,
    };
    // split_depth:0 special:0 code:1 data:1 library:0
    representation_hash(5, &[0b0011_0000], &[code, data.digest()])
}

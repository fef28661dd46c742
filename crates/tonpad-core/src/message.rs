//! TL-B layouts for internal and external messages.

use std::sync::Arc;

use crate::address::Address;
use crate::cell::{Cell, CellBuilder};
use crate::error::CellError;

/// Bytes of comment text that fit in the first cell after the 32-bit opcode.
const FIRST_CHUNK_BYTES: usize = 123 - 4;
/// Bytes of comment text that fit in each continuation cell.
const NEXT_CHUNK_BYTES: usize = 127;

/// A plain TON transfer carried inside an internal message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InternalTransfer {
    pub destination: Address,
    pub value: u64,
    pub bounce: bool,
    pub comment: Option<String>,
}

impl InternalTransfer {
    /// Build the `int_msg_info` message cell. Source, fees and logical time
    /// are left zero for the validator to fill in.
    pub fn to_cell(&self) -> Result<Cell, CellError> {
        let mut b = CellBuilder::new();
        b.store_bit(false)? // int_msg_info$0
            .store_bit(true)? // ihr_disabled
            .store_bit(self.bounce)?
            .store_bit(false)? // bounced
            .store_address(None)?
            .store_address(Some(&self.destination))?
            .store_coins(self.value as u128)?
            .store_bit(false)? // no extra currencies
            .store_coins(0)? // ihr_fee
            .store_coins(0)? // fwd_fee
            .store_uint(0, 64)? // created_lt
            .store_uint(0, 32)? // created_at
            .store_bit(false)?; // no state init
        match &self.comment {
            Some(text) => {
                b.store_bit(true)?;
                b.store_ref(Arc::new(comment_cell(text)?))?;
            }
            None => {
                b.store_bit(false)?;
            }
        }
        Ok(b.build())
    }
}

/// A text comment payload: opcode 0 followed by UTF-8 bytes, continued
/// through a chain of single references when it does not fit in one cell.
pub fn comment_cell(text: &str) -> Result<Cell, CellError> {
    let bytes = text.as_bytes();
    let first = bytes.len().min(FIRST_CHUNK_BYTES);
    let (head, mut rest) = bytes.split_at(first);

    let mut chunks = Vec::new();
    while !rest.is_empty() {
        let n = rest.len().min(NEXT_CHUNK_BYTES);
        chunks.push(&rest[..n]);
        rest = &rest[n..];
    }

    let mut tail: Option<Arc<Cell>> = None;
    for chunk in chunks.into_iter().rev() {
        let mut b = CellBuilder::new();
        b.store_bytes(chunk)?;
        if let Some(next) = tail.take() {
            b.store_ref(next)?;
        }
        tail = Some(Arc::new(b.build()));
    }

    let mut b = CellBuilder::new();
    b.store_uint(0, 32)?.store_bytes(head)?;
    if let Some(next) = tail {
        b.store_ref(next)?;
    }
    Ok(b.build())
}

/// Build an `ext_in_msg_info` message addressed to `destination` with the
/// body stored by reference and no state init.
pub fn external_message(destination: &Address, body: Arc<Cell>) -> Result<Cell, CellError> {
    let mut b = CellBuilder::new();
    b.store_uint(0b10, 2)? // ext_in_msg_info$10
        .store_address(None)?
        .store_address(Some(destination))?
        .store_coins(0)? // import_fee
        .store_bit(false)? // no state init
        .store_bit(true)? // body as reference
        .store_ref(body)?;
    Ok(b.build())
}

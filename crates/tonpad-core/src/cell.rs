//! Ordinary TVM cells and a bit-level builder.
//!
//! A cell holds up to 1023 data bits and up to 4 references to child cells.
//! Its identity is the SHA-256 *representation hash*:
//!
//! ```text
//! sha256(d1 || d2 || padded_data || depth(ref_0..n) || hash(ref_0..n))
//! ```
//!
//! where `d1` is the reference count (ordinary, level 0), `d2` is
//! `floor(bits / 8) + ceil(bits / 8)`, and `padded_data` carries a completion
//! tag (a single `1` bit followed by zeros) when `bits` is not a multiple of 8.
//! Depths are big-endian `u16`.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::constants::{MAX_CELL_BITS, MAX_CELL_REFS};
use crate::error::CellError;

/// Hash and depth of a cell: everything a parent needs to reference it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellDigest {
    /// Representation hash.
    pub hash: [u8; 32],
    /// Maximum distance to a leaf.
    pub depth: u16,
}

/// An immutable ordinary cell with its hash computed at construction.
#[derive(Clone)]
pub struct Cell {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Arc<Cell>>,
    digest: CellDigest,
}

impl Cell {
    /// The cell with no data and no references.
    pub fn empty() -> Self {
        CellBuilder::new().build()
    }

    fn from_parts(data: Vec<u8>, bit_len: usize, refs: Vec<Arc<Cell>>) -> Self {
        let ref_digests: Vec<CellDigest> = refs.iter().map(|r| r.digest()).collect();
        let hash = representation_hash(bit_len, &data, &ref_digests);
        let depth = ref_digests
            .iter()
            .map(|d| d.depth.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self {
            data,
            bit_len,
            refs,
            digest: CellDigest { hash, depth },
        }
    }

    /// Number of data bits.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Raw data bytes without the completion tag. Trailing bits are zero.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Child references in order.
    pub fn refs(&self) -> &[Arc<Cell>] {
        &self.refs
    }

    /// Representation hash.
    pub fn hash(&self) -> [u8; 32] {
        self.digest.hash
    }

    /// Depth of the cell tree rooted here.
    pub fn depth(&self) -> u16 {
        self.digest.depth
    }

    pub fn digest(&self) -> CellDigest {
        self.digest
    }

    /// The two descriptor bytes `d1`, `d2`.
    pub fn descriptors(&self) -> [u8; 2] {
        descriptors(self.bit_len, self.refs.len())
    }

    /// Data bytes with the completion tag applied.
    pub fn padded_data(&self) -> Vec<u8> {
        padded(self.bit_len, &self.data)
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.digest.hash == other.digest.hash
    }
}

impl Eq for Cell {}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("bits", &self.bit_len)
            .field("refs", &self.refs.len())
            .field("hash", &hex::encode(self.digest.hash))
            .finish()
    }
}

/// Compute the representation hash of an ordinary cell from its parts.
///
/// Lets callers hash a cell whose children are known only by digest, such as
/// a state init that references well-known contract code.
pub fn representation_hash(bit_len: usize, data: &[u8], refs: &[CellDigest]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(descriptors(bit_len, refs.len()));
    hasher.update(padded(bit_len, data));
    for r in refs {
        hasher.update(r.depth.to_be_bytes());
    }
    for r in refs {
        hasher.update(r.hash);
    }
    hasher.finalize().into()
}

fn descriptors(bit_len: usize, ref_count: usize) -> [u8; 2] {
    let d1 = ref_count as u8;
    let d2 = (bit_len / 8 + bit_len.div_ceil(8)) as u8;
    [d1, d2]
}

fn padded(bit_len: usize, data: &[u8]) -> Vec<u8> {
    let mut out = data[..bit_len.div_ceil(8)].to_vec();
    if bit_len % 8 != 0 {
        out[bit_len / 8] |= 0x80 >> (bit_len % 8);
    }
    out
}

/// Incremental cell builder. Every store checks the 1023-bit / 4-ref limits.
#[derive(Clone, Debug, Default)]
pub struct CellBuilder {
    data: Vec<u8>,
    bit_len: usize,
    refs: Vec<Arc<Cell>>,
}

impl CellBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits stored so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Bits still available.
    pub fn remaining_bits(&self) -> usize {
        MAX_CELL_BITS - self.bit_len
    }

    fn reserve(&self, bits: usize) -> Result<(), CellError> {
        let total = self.bit_len + bits;
        if total > MAX_CELL_BITS {
            return Err(CellError::BitOverflow {
                bits: total,
                max: MAX_CELL_BITS,
            });
        }
        Ok(())
    }

    fn push_bit(&mut self, bit: bool) {
        if self.bit_len % 8 == 0 {
            self.data.push(0);
        }
        if bit {
            self.data[self.bit_len / 8] |= 0x80 >> (self.bit_len % 8);
        }
        self.bit_len += 1;
    }

    pub fn store_bit(&mut self, bit: bool) -> Result<&mut Self, CellError> {
        self.reserve(1)?;
        self.push_bit(bit);
        Ok(self)
    }

    /// Store the low `bits` bits of `value`, most significant first.
    pub fn store_uint(&mut self, value: u128, bits: usize) -> Result<&mut Self, CellError> {
        if bits < 128 && value >> bits != 0 {
            return Err(CellError::ValueTooWide { value, bits });
        }
        self.reserve(bits)?;
        for i in (0..bits).rev() {
            let bit = if i >= 128 { false } else { (value >> i) & 1 == 1 };
            self.push_bit(bit);
        }
        Ok(self)
    }

    /// Store a two's-complement signed integer in `bits` bits.
    pub fn store_int(&mut self, value: i64, bits: usize) -> Result<&mut Self, CellError> {
        let in_range = match bits {
            0 => value == 0,
            1..=63 => {
                let bound = 1i64 << (bits - 1);
                (-bound..bound).contains(&value)
            }
            _ => true,
        };
        if !in_range {
            return Err(CellError::ValueTooWide {
                value: value as u128,
                bits,
            });
        }
        let mask = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
        self.store_uint((value as u64 & mask) as u128, bits)
    }

    pub fn store_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, CellError> {
        self.reserve(bytes.len() * 8)?;
        for byte in bytes {
            for i in (0..8).rev() {
                self.push_bit((byte >> i) & 1 == 1);
            }
        }
        Ok(self)
    }

    /// Store a `VarUInteger 16` (the TL-B `Grams` / coins encoding).
    pub fn store_coins(&mut self, amount: u128) -> Result<&mut Self, CellError> {
        let len = (128 - amount.leading_zeros() as usize).div_ceil(8);
        if len > 15 {
            return Err(CellError::CoinsTooWide(len));
        }
        self.reserve(4 + len * 8)?;
        self.store_uint(len as u128, 4)?;
        self.store_uint(amount, len * 8)
    }

    /// Store a `MsgAddress`: `addr_none$00` or `addr_std$10` without anycast.
    pub fn store_address(&mut self, address: Option<&Address>) -> Result<&mut Self, CellError> {
        match address {
            None => self.store_uint(0, 2),
            Some(addr) => {
                self.reserve(2 + 1 + 8 + 256)?;
                self.store_uint(0b10, 2)?;
                self.store_bit(false)?;
                self.store_int(addr.workchain() as i64, 8)?;
                self.store_bytes(addr.hash())
            }
        }
    }

    pub fn store_ref(&mut self, cell: Arc<Cell>) -> Result<&mut Self, CellError> {
        if self.refs.len() >= MAX_CELL_REFS {
            return Err(CellError::RefOverflow {
                refs: self.refs.len() + 1,
                max: MAX_CELL_REFS,
            });
        }
        self.refs.push(cell);
        Ok(self)
    }

    /// Append the bits and references of another builder.
    pub fn store_builder(&mut self, other: &CellBuilder) -> Result<&mut Self, CellError> {
        self.reserve(other.bit_len)?;
        if self.refs.len() + other.refs.len() > MAX_CELL_REFS {
            return Err(CellError::RefOverflow {
                refs: self.refs.len() + other.refs.len(),
                max: MAX_CELL_REFS,
            });
        }
        for i in 0..other.bit_len {
            let bit = other.data[i / 8] & (0x80 >> (i % 8)) != 0;
            self.push_bit(bit);
        }
        self.refs.extend(other.refs.iter().cloned());
        Ok(self)
    }

    pub fn build(self) -> Cell {
        Cell::from_parts(self.data, self.bit_len, self.refs)
    }
}

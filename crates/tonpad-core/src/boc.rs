//! Bag-of-cells serialization.
//!
//! Produces the generic `serialized_boc#b5ee9c72` layout with a single root,
//! no offset index and no CRC32C. Identical subtrees are written once; cells
//! are ordered so that every parent precedes its children.

use std::collections::{HashMap, HashSet};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::cell::Cell;

/// BOC magic prefix.
pub const BOC_MAGIC: [u8; 4] = [0xb5, 0xee, 0x9c, 0x72];

/// Serialize a cell tree into BOC bytes.
pub fn serialize(root: &Cell) -> Vec<u8> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    post_order(root, &mut seen, &mut order);
    order.reverse();

    let index: HashMap<[u8; 32], usize> = order
        .iter()
        .enumerate()
        .map(|(i, cell)| (cell.hash(), i))
        .collect();

    let size_bytes = byte_width(order.len());
    let cell_len = |cell: &Cell| 2 + cell.bit_len().div_ceil(8) + cell.refs().len() * size_bytes;
    let total_size: usize = order.iter().map(|c| cell_len(c)).sum();
    let offset_bytes = byte_width(total_size);

    let mut out = Vec::with_capacity(4 + 3 + 4 * size_bytes + offset_bytes + total_size);
    out.extend_from_slice(&BOC_MAGIC);
    // has_idx = 0, has_crc32c = 0, has_cache_bits = 0, flags = 0, size:3
    out.push(size_bytes as u8);
    out.push(offset_bytes as u8);
    push_be(&mut out, order.len(), size_bytes);
    push_be(&mut out, 1, size_bytes);
    push_be(&mut out, 0, size_bytes);
    push_be(&mut out, total_size, offset_bytes);
    push_be(&mut out, 0, size_bytes);

    for cell in &order {
        out.extend_from_slice(&cell.descriptors());
        out.extend_from_slice(&cell.padded_data());
        for child in cell.refs() {
            push_be(&mut out, index[&child.hash()], size_bytes);
        }
    }
    out
}

/// Serialize a cell tree and encode it as standard base64.
pub fn to_base64(root: &Cell) -> String {
    STANDARD.encode(serialize(root))
}

fn post_order<'a>(cell: &'a Cell, seen: &mut HashSet<[u8; 32]>, out: &mut Vec<&'a Cell>) {
    if !seen.insert(cell.hash()) {
        return;
    }
    for child in cell.refs() {
        post_order(child, seen, out);
    }
    out.push(cell);
}

fn byte_width(mut n: usize) -> usize {
    let mut width = 1;
    while n >= 256 {
        n >>= 8;
        width += 1;
    }
    width
}

fn push_be(out: &mut Vec<u8>, value: usize, width: usize) {
    let bytes = (value as u64).to_be_bytes();
    out.extend_from_slice(&bytes[8 - width..]);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cell::CellBuilder;

    #[test]
    fn empty_cell_boc() {
        assert_eq!(
            hex::encode(serialize(&Cell::empty())),
            "b5ee9c72010101010002000000"
        );
        assert_eq!(to_base64(&Cell::empty()), "te6ccgEBAQEAAgAAAA==");
    }

    #[test]
    fn shared_child_written_once() {
        let leaf = {
            let mut b = CellBuilder::new();
            b.store_uint(0xab, 8).unwrap();
            Arc::new(b.build())
        };
        let mut root = CellBuilder::new();
        root.store_ref(leaf.clone()).unwrap();
        root.store_ref(leaf).unwrap();
        let bytes = serialize(&root.build());

        // header: magic, size=1, off=1, cells=2, roots=1, absent=0, tot, root=0
        assert_eq!(&bytes[..4], &BOC_MAGIC);
        assert_eq!(bytes[6], 2);
        let total = bytes[9] as usize;
        // root: 2 descriptors + 2 refs; leaf: 2 descriptors + 1 data byte
        assert_eq!(total, 4 + 3);
        assert_eq!(bytes.len(), 11 + total);
        // root cell first, both refs point at index 1
        assert_eq!(&bytes[11..15], &[2, 0, 1, 1]);
        assert_eq!(&bytes[15..], &[0, 2, 0xab]);
    }

    #[test]
    fn parents_precede_children() {
        let leaf = Arc::new(Cell::empty());
        let mut mid = CellBuilder::new();
        mid.store_uint(1, 1).unwrap();
        mid.store_ref(leaf.clone()).unwrap();
        let mid = Arc::new(mid.build());
        let mut root = CellBuilder::new();
        root.store_ref(leaf).unwrap();
        root.store_ref(mid).unwrap();
        let bytes = serialize(&root.build());

        let cells = bytes[6] as usize;
        assert_eq!(cells, 3);
        // walk the cell section and check every ref index is larger than its owner
        let mut pos = 11;
        for i in 0..cells {
            let refs = bytes[pos] as usize;
            let data_len = (bytes[pos + 1] as usize).div_ceil(2);
            pos += 2 + data_len;
            for _ in 0..refs {
                assert!(bytes[pos] as usize > i);
                pos += 1;
            }
        }
        assert_eq!(pos, bytes.len());
    }

    #[test]
    fn byte_width_boundaries() {
        assert_eq!(byte_width(0), 1);
        assert_eq!(byte_width(255), 1);
        assert_eq!(byte_width(256), 2);
        assert_eq!(byte_width(65_536), 3);
    }
}

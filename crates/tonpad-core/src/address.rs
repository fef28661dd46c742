//! TON account addresses.
//!
//! An address is a workchain id plus the 32-byte hash of the account's
//! state init. It has two textual forms:
//!
//! - raw: `<workchain>:<64 hex chars>`, e.g. `0:5ddd…0ce8`
//! - user-friendly: 36 bytes `tag | workchain | hash | crc16` in base64
//!   (48 characters), where the tag carries the bounceable and test-only
//!   flags and the checksum is CRC16-XMODEM over the first 34 bytes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};

use crate::error::AddressError;

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TEST_ONLY: u8 = 0x80;

/// Length of a decoded user-friendly address.
const FRIENDLY_LEN: usize = 36;

/// Network an address or endpoint belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

impl Network {
    /// Lowercase name used by endpoint services (`"mainnet"` / `"testnet"`).
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Network::Testnet)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(format!("invalid network '{other}' (must be 'mainnet' or 'testnet')")),
        }
    }
}

/// Flags for rendering a user-friendly address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FriendlyFormat {
    /// Ask the network to bounce messages back if the destination rejects them.
    pub bounceable: bool,
    /// Mark the address as belonging to the test network.
    pub test_only: bool,
    /// Use the URL-safe base64 alphabet (`-`, `_`).
    pub url_safe: bool,
}

impl FriendlyFormat {
    /// The form shown to users of this tool: non-bounceable, URL-safe, test-only
    /// on testnet.
    pub fn display_for(network: Network) -> Self {
        Self {
            bounceable: false,
            test_only: network.is_testnet(),
            url_safe: true,
        }
    }
}

/// A standard (`addr_std`, no anycast) account address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    workchain: i8,
    hash: [u8; 32],
}

/// An address decoded from user-friendly form, with the flags it carried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedFriendly {
    pub address: Address,
    pub bounceable: bool,
    pub test_only: bool,
}

impl Address {
    pub fn new(workchain: i8, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    pub fn workchain(&self) -> i8 {
        self.workchain
    }

    /// Account id: the state init hash.
    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Raw form `wc:hex`.
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }

    /// User-friendly base64 form.
    pub fn to_friendly(&self, format: FriendlyFormat) -> String {
        let mut tag = if format.bounceable {
            TAG_BOUNCEABLE
        } else {
            TAG_NON_BOUNCEABLE
        };
        if format.test_only {
            tag |= TAG_TEST_ONLY;
        }
        let mut bytes = Vec::with_capacity(FRIENDLY_LEN);
        bytes.push(tag);
        bytes.push(self.workchain as u8);
        bytes.extend_from_slice(&self.hash);
        bytes.extend_from_slice(&crc16(&bytes).to_be_bytes());
        if format.url_safe {
            URL_SAFE.encode(bytes)
        } else {
            STANDARD.encode(bytes)
        }
    }

    /// Decode a user-friendly address in either base64 alphabet.
    pub fn parse_friendly(s: &str) -> Result<ParsedFriendly, AddressError> {
        if s.len() != 48 {
            return Err(AddressError::InvalidLength(s.len()));
        }
        let decoded = if s.contains(['-', '_']) {
            URL_SAFE.decode(s)
        } else {
            STANDARD.decode(s)
        };
        let bytes = decoded.map_err(|e| AddressError::InvalidBase64(e.to_string()))?;
        if bytes.len() != FRIENDLY_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }

        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        if crc16(&bytes[..34]) != expected {
            return Err(AddressError::InvalidChecksum);
        }

        let mut tag = bytes[0];
        let test_only = tag & TAG_TEST_ONLY != 0;
        if test_only {
            tag ^= TAG_TEST_ONLY;
        }
        let bounceable = match tag {
            TAG_BOUNCEABLE => true,
            TAG_NON_BOUNCEABLE => false,
            _ => return Err(AddressError::InvalidTag(bytes[0])),
        };

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[2..34]);
        Ok(ParsedFriendly {
            address: Address::new(bytes[1] as i8, hash),
            bounceable,
            test_only,
        })
    }

    /// Decode a raw `wc:hex` address.
    pub fn parse_raw(s: &str) -> Result<Self, AddressError> {
        let (wc, hash_hex) = s
            .split_once(':')
            .ok_or_else(|| AddressError::InvalidWorkchain(s.to_string()))?;
        let workchain: i8 = wc
            .parse()
            .map_err(|_| AddressError::InvalidWorkchain(wc.to_string()))?;
        let bytes = hex::decode(hash_hex).map_err(|e| AddressError::InvalidHash(e.to_string()))?;
        let hash: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| AddressError::InvalidHash(format!("{} bytes", b.len())))?;
        Ok(Self::new(workchain, hash))
    }

    /// Decode either textual form.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        if s.contains(':') {
            Self::parse_raw(s)
        } else {
            Self::parse_friendly(s).map(|p| p.address)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_raw())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// CRC16-XMODEM (poly 0x1021, init 0, no reflection).
fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

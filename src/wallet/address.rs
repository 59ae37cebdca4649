//! TON textual address parsing.
//!
//! Validates the two wire-text encodings accepted by the reward API before a
//! transfer is attempted:
//!
//! - **Friendly**: 48-char base64 / base64url, 36 bytes decoded
//!   (tag, workchain, 32-byte account hash, CRC-16/XMODEM checksum)
//! - **Raw**: `workchain:hex64`, e.g. `0:abc...` (64 hex chars)
//!
//! Parsing is a format check only; account existence is the chain's problem.

use crc::{CRC_16_XMODEM, Crc};
use thiserror::Error;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Friendly-address tag bits (first byte of the decoded form).
const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TESTNET_FLAG: u8 = 0x80;

#[derive(Debug, Error, PartialEq)]
pub enum AddressParseError {
    #[error("address is empty")]
    Empty,
    #[error("address matches no known encoding (friendly base64 or raw wc:hex)")]
    UnknownEncoding,
    #[error("friendly address must decode to 36 bytes, got {0}")]
    BadLength(usize),
    #[error("friendly address checksum mismatch")]
    BadChecksum,
    #[error("unsupported address tag byte {0:#04x}")]
    BadTag(u8),
    #[error("invalid workchain: {0}")]
    BadWorkchain(String),
    #[error("account hash must be 64 hex chars")]
    BadHash,
}

/// A parsed TON account address.
///
/// Keeps the caller-supplied text verbatim so responses and ledger records
/// echo exactly what the client sent.
#[derive(Debug, Clone)]
pub struct TonAddress {
    pub workchain: i8,
    pub hash: [u8; 32],
    bounceable: bool,
    testnet: bool,
    text: String,
}

impl TonAddress {
    /// Parse an address, trying the friendly form first and falling back to
    /// the raw `wc:hex` form. Both must fail before the input is rejected.
    pub fn parse(input: &str) -> Result<Self, AddressParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AddressParseError::Empty);
        }

        match Self::parse_friendly(input) {
            Ok(addr) => Ok(addr),
            Err(friendly_err) => match Self::parse_raw(input) {
                Ok(addr) => Ok(addr),
                // Report the more specific failure: a 48-char input was
                // clearly meant to be friendly form.
                Err(_) if input.len() == 48 => Err(friendly_err),
                Err(_) => Err(AddressParseError::UnknownEncoding),
            },
        }
    }

    /// Parse the user-friendly form: base64(url) of
    /// `tag(1) | workchain(1) | hash(32) | crc16(2)`.
    pub fn parse_friendly(input: &str) -> Result<Self, AddressParseError> {
        use base64::Engine;

        let bytes = base64::engine::general_purpose::URL_SAFE
            .decode(input)
            .or_else(|_| base64::engine::general_purpose::STANDARD.decode(input))
            .map_err(|_| AddressParseError::UnknownEncoding)?;

        if bytes.len() != 36 {
            return Err(AddressParseError::BadLength(bytes.len()));
        }

        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        if CRC16.checksum(&bytes[..34]) != expected {
            return Err(AddressParseError::BadChecksum);
        }

        let tag = bytes[0];
        let (bounceable, testnet) = match (tag & !TAG_TESTNET_FLAG, tag & TAG_TESTNET_FLAG != 0) {
            (TAG_BOUNCEABLE, testnet) => (true, testnet),
            (TAG_NON_BOUNCEABLE, testnet) => (false, testnet),
            _ => return Err(AddressParseError::BadTag(tag)),
        };

        let workchain = bytes[1] as i8;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[2..34]);

        Ok(Self {
            workchain,
            hash,
            bounceable,
            testnet,
            text: input.to_string(),
        })
    }

    /// Parse the raw form: `workchain:hash` with a 64-char hex hash.
    pub fn parse_raw(input: &str) -> Result<Self, AddressParseError> {
        let (wc, hex_part) = input
            .split_once(':')
            .ok_or(AddressParseError::UnknownEncoding)?;

        let workchain: i8 = wc
            .parse::<i32>()
            .ok()
            .and_then(|n| i8::try_from(n).ok())
            .ok_or_else(|| AddressParseError::BadWorkchain(wc.to_string()))?;

        if hex_part.len() != 64 {
            return Err(AddressParseError::BadHash);
        }
        let decoded = hex::decode(hex_part).map_err(|_| AddressParseError::BadHash)?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&decoded);

        Ok(Self {
            workchain,
            hash,
            bounceable: true,
            testnet: false,
            text: input.to_string(),
        })
    }

    /// Build an address from its parts (used for deterministic placeholder
    /// addresses in the simulated wallet backend).
    pub fn from_parts(workchain: i8, hash: [u8; 32]) -> Self {
        let text = format!("{}:{}", workchain, hex::encode(hash));
        Self {
            workchain,
            hash,
            bounceable: true,
            testnet: false,
            text,
        }
    }

    pub fn is_bounceable(&self) -> bool {
        self.bounceable
    }

    pub fn is_testnet(&self) -> bool {
        self.testnet
    }

    /// Raw `workchain:hex` rendering, independent of the input form.
    pub fn to_raw(&self) -> String {
        format!("{}:{}", self.workchain, hex::encode(self.hash))
    }
}

impl std::fmt::Display for TonAddress {
    /// Prints the address exactly as it was supplied.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq for TonAddress {
    fn eq(&self, other: &Self) -> bool {
        self.workchain == other.workchain && self.hash == other.hash
    }
}

impl Eq for TonAddress {}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    /// Build a checksummed friendly address for tests.
    fn friendly(tag: u8, workchain: u8, hash: [u8; 32], url_safe: bool) -> String {
        let mut bytes = Vec::with_capacity(36);
        bytes.push(tag);
        bytes.push(workchain);
        bytes.extend_from_slice(&hash);
        let crc = CRC16.checksum(&bytes);
        bytes.extend_from_slice(&crc.to_be_bytes());
        if url_safe {
            base64::engine::general_purpose::URL_SAFE.encode(bytes)
        } else {
            base64::engine::general_purpose::STANDARD.encode(bytes)
        }
    }

    #[test]
    fn parses_friendly_bounceable() {
        let text = friendly(TAG_BOUNCEABLE, 0, [0xab; 32], true);
        let addr = TonAddress::parse(&text).unwrap();
        assert_eq!(addr.workchain, 0);
        assert_eq!(addr.hash, [0xab; 32]);
        assert!(addr.is_bounceable());
        assert!(!addr.is_testnet());
        // Display echoes the input verbatim
        assert_eq!(addr.to_string(), text);
    }

    #[test]
    fn parses_friendly_non_bounceable_testnet() {
        let text = friendly(TAG_NON_BOUNCEABLE | TAG_TESTNET_FLAG, 0, [1; 32], true);
        let addr = TonAddress::parse(&text).unwrap();
        assert!(!addr.is_bounceable());
        assert!(addr.is_testnet());
    }

    #[test]
    fn parses_standard_base64_alphabet() {
        // Hash chosen so the encoding contains '+' or '/' in standard base64
        let mut hash = [0u8; 32];
        hash[0] = 0xfb;
        hash[1] = 0xef;
        let text = friendly(TAG_BOUNCEABLE, 0, hash, false);
        assert!(TonAddress::parse(&text).is_ok());
    }

    #[test]
    fn parses_raw_form() {
        let raw = format!("0:{}", "ab".repeat(32));
        let addr = TonAddress::parse(&raw).unwrap();
        assert_eq!(addr.workchain, 0);
        assert_eq!(addr.to_raw(), raw);

        let masterchain = format!("-1:{}", "00".repeat(32));
        assert_eq!(TonAddress::parse(&masterchain).unwrap().workchain, -1);
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut text = friendly(TAG_BOUNCEABLE, 0, [7; 32], true);
        // Corrupt one checksum character
        let last = text.pop().unwrap();
        text.push(if last == 'A' { 'B' } else { 'A' });
        assert_eq!(
            TonAddress::parse(&text),
            Err(AddressParseError::BadChecksum)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(TonAddress::parse("").is_err());
        assert!(TonAddress::parse("not-an-address").is_err());
        assert!(TonAddress::parse("0:shorthex").is_err());
        assert!(TonAddress::parse("zz:0000").is_err());
    }

    #[test]
    fn friendly_and_raw_forms_compare_equal() {
        let hash = [0x42; 32];
        let friendly_addr = TonAddress::parse(&friendly(TAG_BOUNCEABLE, 0, hash, true)).unwrap();
        let raw_addr = TonAddress::parse(&format!("0:{}", hex::encode(hash))).unwrap();
        assert_eq!(friendly_addr, raw_addr);
    }
}

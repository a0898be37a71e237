//! Record codec.
//!
//! Items are stored as JSON; the ID counter is a raw 8-byte big-endian
//! integer so it can be read without a parser.
use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::Item;

/// Width of an encoded counter value.
pub const COUNTER_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed item record: {0}")]
    Item(#[from] serde_json::Error),

    #[error("counter record must be 8 bytes, found {0}")]
    CounterLength(usize),
}

pub fn encode_item(item: &Item) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(item)?)
}

pub fn decode_item(bytes: &[u8]) -> Result<Item, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}

pub fn encode_counter(value: u64) -> [u8; COUNTER_LEN] {
    let mut buf = [0u8; COUNTER_LEN];
    BigEndian::write_u64(&mut buf, value);
    buf
}

pub fn decode_counter(bytes: &[u8]) -> Result<u64, CodecError> {
    if bytes.len() != COUNTER_LEN {
        return Err(CodecError::CounterLength(bytes.len()));
    }
    Ok(BigEndian::read_u64(bytes))
}

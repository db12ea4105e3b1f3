//! Binary row framing.

use crate::error::{Error, Result};
use crate::format::{read_full, Framing};
use crate::row::{Op, Row};
use std::io::BufRead;

/// Header size: op (1) + key length u8 (1) + value length u32 BE (4).
const HEADER_LEN: usize = 6;

/// Compact binary framing with a fixed 6-byte header.
///
/// Layout: op byte (`'+'` set, `'-'` delete), key length as unsigned
/// 8-bit, value length as unsigned 32-bit big-endian, key bytes, value
/// bytes. Rows are concatenated with no separator.
///
/// This is the default framing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryFraming;

impl Framing for BinaryFraming {
    fn encode(&self, row: &Row) -> Result<Vec<u8>> {
        row.validate()?;

        // Delete rows never carry value bytes.
        let value: &[u8] = match row.op {
            Op::Set => &row.value,
            Op::Delete => &[],
        };

        let mut encoded = Vec::with_capacity(HEADER_LEN + row.key.len() + value.len());
        encoded.push(row.op.as_byte());
        encoded.push(row.key.len() as u8);
        encoded.extend_from_slice(&(value.len() as u32).to_be_bytes());
        encoded.extend_from_slice(&row.key);
        encoded.extend_from_slice(value);
        Ok(encoded)
    }

    fn decode_from(&self, r: &mut dyn BufRead) -> Result<(Row, usize)> {
        let mut header = [0u8; HEADER_LEN];
        let mut consumed = read_full(r, &mut header)?;
        if consumed < HEADER_LEN {
            return Err(Error::ShortRead { consumed });
        }

        let op = Op::from_byte(header[0]).ok_or(Error::UnknownOp { byte: header[0] })?;
        let key_len = header[1] as usize;
        let value_len = u32::from_be_bytes([header[2], header[3], header[4], header[5]]) as usize;

        let mut key = vec![0u8; key_len];
        let n = read_full(r, &mut key)?;
        consumed += n;
        if n < key_len {
            return Err(Error::ShortRead { consumed });
        }

        let mut value = vec![0u8; value_len];
        let n = read_full(r, &mut value)?;
        consumed += n;
        if n < value_len {
            return Err(Error::ShortRead { consumed });
        }

        Ok((Row { op, key, value }, consumed))
    }
}

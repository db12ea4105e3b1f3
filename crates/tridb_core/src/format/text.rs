//! Plain-text row framing.

use crate::error::{Error, Result};
use crate::format::{read_full, Framing};
use crate::row::{Op, Row, MAX_KEY_LEN};
use std::io::BufRead;

/// Plain-text framing, easy to read and hand-edit.
///
/// Layout: op byte, op suffix, key bytes, key suffix, value bytes, value
/// suffix. With the default suffixes a row reads `+ key value\n`.
///
/// Fields are delimited by sentinel bytes, so the key must not contain the
/// key suffix and the value must not contain the value suffix; encoding
/// fails otherwise.
#[derive(Debug, Clone, Copy)]
pub struct TextFraming {
    /// Byte written after the op (default `' '`).
    pub op_suffix: u8,
    /// Byte terminating the key (default `' '`).
    pub key_suffix: u8,
    /// Byte terminating the value (default `'\n'`).
    pub value_suffix: u8,
}

impl Default for TextFraming {
    fn default() -> Self {
        Self {
            op_suffix: b' ',
            key_suffix: b' ',
            value_suffix: b'\n',
        }
    }
}

impl Framing for TextFraming {
    fn encode(&self, row: &Row) -> Result<Vec<u8>> {
        row.validate()?;

        // Delete rows never carry value bytes.
        let value: &[u8] = match row.op {
            Op::Set => &row.value,
            Op::Delete => &[],
        };

        if let Some(index) = row.key.iter().position(|&b| b == self.key_suffix) {
            return Err(Error::SentinelInKey {
                byte: self.key_suffix,
                index,
            });
        }
        if let Some(index) = value.iter().position(|&b| b == self.value_suffix) {
            return Err(Error::SentinelInValue {
                byte: self.value_suffix,
                index,
            });
        }

        let mut encoded = Vec::with_capacity(4 + row.key.len() + value.len());
        encoded.push(row.op.as_byte());
        encoded.push(self.op_suffix);
        encoded.extend_from_slice(&row.key);
        encoded.push(self.key_suffix);
        encoded.extend_from_slice(value);
        encoded.push(self.value_suffix);
        Ok(encoded)
    }

    fn decode_from(&self, r: &mut dyn BufRead) -> Result<(Row, usize)> {
        // Op byte and its suffix.
        let mut head = [0u8; 2];
        let mut consumed = read_full(r, &mut head)?;
        if consumed < head.len() {
            return Err(Error::ShortRead { consumed });
        }
        let op = Op::from_byte(head[0]).ok_or(Error::UnknownOp { byte: head[0] })?;
        if head[1] != self.op_suffix {
            return Err(Error::BadSuffix {
                expected: self.op_suffix,
                got: head[1],
            });
        }

        // Key up to and including its suffix.
        let mut key = Vec::new();
        consumed += r.read_until(self.key_suffix, &mut key)?;
        if key.last() != Some(&self.key_suffix) {
            return Err(Error::ShortRead { consumed });
        }
        key.pop();
        if key.len() > MAX_KEY_LEN {
            return Err(Error::bad_length(format!(
                "key length {} exceeds {MAX_KEY_LEN}",
                key.len()
            )));
        }

        // Value up to and including its suffix.
        let mut value = Vec::new();
        consumed += r.read_until(self.value_suffix, &mut value)?;
        if value.last() != Some(&self.value_suffix) {
            return Err(Error::ShortRead { consumed });
        }
        value.pop();

        Ok((Row { op, key, value }, consumed))
    }
}

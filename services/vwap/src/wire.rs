//! Binary field primitives
//!
//! A borrowing cursor over one frame body. All multi-byte integers on the
//! feed are big-endian; prices are 4-byte integers in ten-thousandths;
//! symbols are fixed 8-byte fields. Reads never panic: running out of
//! bytes yields `ShortRead` with the positions involved.

use thiserror::Error;
use types::numeric::Price;
use types::symbol::{Symbol, SYMBOL_LEN};

/// Failure to pull a field out of a frame body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("short read: needed {needed} bytes, {available} available")]
    ShortRead { needed: usize, available: usize },
}

/// Cursor over a single frame body.
#[derive(Debug)]
pub struct Wire<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Wire<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let available = self.remaining();
        if available < n {
            return Err(WireError::ShortRead {
                needed: n,
                available,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a big-endian unsigned integer of `width` bytes (1 ..= 8).
    ///
    /// The most significant byte is the first byte read.
    pub fn read_be(&mut self, width: usize) -> Result<u64, WireError> {
        debug_assert!((1..=8).contains(&width), "width out of range");
        let bytes = self.take(width)?;
        let mut value = 0u64;
        for &byte in bytes {
            value = (value << 8) | u64::from(byte);
        }
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.read_be(1)? as u8)
    }

    pub fn read_u16(&mut self) -> Result<u16, WireError> {
        Ok(self.read_be(2)? as u16)
    }

    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        Ok(self.read_be(4)? as u32)
    }

    /// Feed timestamps are 48-bit nanoseconds since midnight.
    pub fn read_u48(&mut self) -> Result<u64, WireError> {
        self.read_be(6)
    }

    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        self.read_be(8)
    }

    /// 4-byte price in ten-thousandths of a currency unit.
    pub fn read_price(&mut self) -> Result<Price, WireError> {
        Ok(Price::from_raw(self.read_u32()?))
    }

    /// Fixed 8-byte symbol field, read verbatim.
    pub fn read_symbol(&mut self) -> Result<Symbol, WireError> {
        let bytes = self.take(SYMBOL_LEN)?;
        let mut field = [0u8; SYMBOL_LEN];
        field.copy_from_slice(bytes);
        Ok(Symbol::new(field))
    }

    /// Discard `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), WireError> {
        self.take(n).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_read_be_msb_first() {
        let bytes = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC];
        let mut wire = Wire::new(&bytes);
        assert_eq!(wire.read_be(6).unwrap(), 0x1234_5678_9ABC);
    }

    #[test]
    fn test_read_be_single_byte() {
        let mut wire = Wire::new(&[0xFF]);
        assert_eq!(wire.read_be(1).unwrap(), 0xFF);
    }

    #[test]
    fn test_short_read_reports_positions() {
        let mut wire = Wire::new(&[0x01, 0x02]);
        let err = wire.read_u32().unwrap_err();
        assert_eq!(
            err,
            WireError::ShortRead {
                needed: 4,
                available: 2
            }
        );
    }

    #[test]
    fn test_sequential_reads_advance() {
        let bytes = [0x00, 0x07, 0xAA, 0xBB];
        let mut wire = Wire::new(&bytes);
        assert_eq!(wire.read_u16().unwrap(), 7);
        assert_eq!(wire.read_u8().unwrap(), 0xAA);
        assert_eq!(wire.remaining(), 1);
    }

    #[test]
    fn test_read_price() {
        let bytes = 15050u32.to_be_bytes();
        let mut wire = Wire::new(&bytes);
        assert_eq!(wire.read_price().unwrap(), Price::from_raw(15050));
    }

    #[test]
    fn test_read_symbol_keeps_padding() {
        let mut wire = Wire::new(b"AAPL    rest");
        let symbol = wire.read_symbol().unwrap();
        assert_eq!(symbol, Symbol::padded("AAPL"));
        assert_eq!(wire.remaining(), 4);
    }

    #[test]
    fn test_skip_consumes_exactly() {
        let mut wire = Wire::new(&[0u8; 10]);
        wire.skip(9).unwrap();
        assert_eq!(wire.remaining(), 1);
        assert!(wire.skip(2).is_err());
    }

    proptest! {
        #[test]
        fn big_endian_roundtrip(width in 1usize..=8, value: u64) {
            let masked = if width == 8 {
                value
            } else {
                value & ((1u64 << (8 * width)) - 1)
            };
            let full = masked.to_be_bytes();
            let encoded = &full[8 - width..];

            let mut wire = Wire::new(encoded);
            prop_assert_eq!(wire.read_be(width).unwrap(), masked);
            prop_assert_eq!(wire.remaining(), 0);
        }
    }
}

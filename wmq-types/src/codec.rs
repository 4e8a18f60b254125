//! Fixed-layout field codec shared by the descriptor and the header records

use bytes::{Buf, BufMut};

use crate::{
    constants::{MqLong, MQENC_INTEGER_MASK, MQENC_INTEGER_REVERSED, MQENC_NATIVE},
    error::DecodeError,
};

/// Byte order of the integer fields of a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Big,
    Little,
}

impl Endian {
    pub fn from_encoding(encoding: MqLong) -> Self {
        if encoding & MQENC_INTEGER_MASK == MQENC_INTEGER_REVERSED {
            Self::Little
        } else {
            Self::Big
        }
    }

    pub fn native() -> Self {
        Self::from_encoding(MQENC_NATIVE)
    }
}

pub(crate) struct Writer<'a, B> {
    buf: &'a mut B,
    endian: Endian,
}

impl<'a, B: BufMut> Writer<'a, B> {
    pub fn new(buf: &'a mut B, endian: Endian) -> Self {
        Self { buf, endian }
    }

    pub fn put_long(&mut self, value: MqLong) {
        match self.endian {
            Endian::Big => self.buf.put_i32(value),
            Endian::Little => self.buf.put_i32_le(value),
        }
    }

    /// Writes `value` blank-padded (or truncated) to exactly `width` bytes
    pub fn put_str(&mut self, value: &str, width: usize) {
        let bytes = value.as_bytes();
        let len = bytes.len().min(width);
        self.buf.put_slice(&bytes[..len]);
        self.buf.put_bytes(b' ', width - len);
    }

    pub fn put_slice(&mut self, value: &[u8]) {
        self.buf.put_slice(value);
    }
}

pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    endian: Endian,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8], endian: Endian) -> Self {
        Self { buf, endian }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// The bytes that have not been consumed yet
    pub fn rest(&self) -> &'a [u8] {
        self.buf
    }

    fn ensure(&self, expected: usize) -> Result<(), DecodeError> {
        if self.buf.remaining() < expected {
            return Err(DecodeError::Truncated {
                expected,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn get_long(&mut self) -> Result<MqLong, DecodeError> {
        self.ensure(4)?;
        let value = match self.endian {
            Endian::Big => self.buf.get_i32(),
            Endian::Little => self.buf.get_i32_le(),
        };
        Ok(value)
    }

    /// Reads a blank-padded field of `width` bytes, trimming trailing blanks
    /// and NULs
    pub fn get_str(&mut self, width: usize) -> Result<String, DecodeError> {
        let bytes = self.get_slice(width)?;
        let end = bytes
            .iter()
            .rposition(|b| *b != b' ' && *b != 0)
            .map(|i| i + 1)
            .unwrap_or(0);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    pub fn get_slice(&mut self, width: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(width)?;
        let (head, tail) = self.buf.split_at(width);
        self.buf = tail;
        Ok(head)
    }

    pub fn get_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.get_slice(N)?);
        Ok(array)
    }

    /// Checks the four-byte eye-catcher that opens every structure
    pub fn expect_struc_id(&mut self, expected: &'static str) -> Result<(), DecodeError> {
        let found = self.get_slice(4)?;
        if found != expected.as_bytes() {
            return Err(DecodeError::StrucId {
                expected,
                found: String::from_utf8_lossy(found).into_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_padded_and_trimmed() {
        let mut buf = Vec::new();
        let mut writer = Writer::new(&mut buf, Endian::Big);
        writer.put_str("ABC", 6);
        writer.put_str("TOOLONGNAME", 4);
        assert_eq!(&buf[..], b"ABC   TOOL");

        let mut reader = Reader::new(&buf, Endian::Big);
        assert_eq!(reader.get_str(6).unwrap(), "ABC");
        assert_eq!(reader.get_str(4).unwrap(), "TOOL");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn integers_follow_encoding() {
        let mut buf = Vec::new();
        Writer::new(&mut buf, Endian::from_encoding(0x0000_0111)).put_long(1);
        Writer::new(&mut buf, Endian::from_encoding(0x0000_0222)).put_long(1);
        assert_eq!(buf, vec![0, 0, 0, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn truncated_read_is_reported() {
        let buf = [0u8; 3];
        let mut reader = Reader::new(&buf, Endian::native());
        assert_eq!(
            reader.get_long(),
            Err(DecodeError::Truncated {
                expected: 4,
                remaining: 3
            })
        );
    }
}

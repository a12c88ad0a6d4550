//! Little-endian readers and writers for the variable-length dictionary sections.
use crate::common::{MAX_ARRAY_LENGTH, MAX_STRING_LENGTH};
use crate::errors::{Result, SudareError};

/// Fixed-size primitives stored in little endian.
pub trait LePrimitive: Sized + Copy {
    /// The number of bytes occupied by the value.
    const SIZE: usize;

    /// Decodes the value from the head of `src`, which holds at least `SIZE` bytes.
    fn from_le_slice(src: &[u8]) -> Self;

    /// Appends the encoded value to `dst`.
    fn extend_le(&self, dst: &mut Vec<u8>);
}

macro_rules! define_le_primitive {
    ($type:ty, $size:expr) => {
        impl LePrimitive for $type {
            const SIZE: usize = $size;

            #[inline(always)]
            fn from_le_slice(src: &[u8]) -> Self {
                let mut buf = [0; $size];
                buf.copy_from_slice(&src[..$size]);
                Self::from_le_bytes(buf)
            }

            #[inline(always)]
            fn extend_le(&self, dst: &mut Vec<u8>) {
                dst.extend_from_slice(&self.to_le_bytes());
            }
        }
    };
}

define_le_primitive!(u8, 1);
define_le_primitive!(u16, 2);
define_le_primitive!(u32, 4);
define_le_primitive!(u64, 8);
define_le_primitive!(i16, 2);
define_le_primitive!(i32, 4);

/// Reads the `index`-th value of a packed array starting at `base`.
#[inline(always)]
pub fn read_at<T: LePrimitive>(data: &[u8], base: usize, index: usize) -> Option<T> {
    let begin = base.checked_add(index.checked_mul(T::SIZE)?)?;
    let end = begin.checked_add(T::SIZE)?;
    data.get(begin..end).map(T::from_le_slice)
}

/// Sequential reader over a byte buffer.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[inline(always)]
    pub const fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    #[inline(always)]
    pub const fn position(&self) -> usize {
        self.pos
    }

    pub fn read<T: LePrimitive>(&mut self) -> Result<T> {
        let bytes = self.read_bytes(T::SIZE)?;
        Ok(T::from_le_slice(bytes))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                SudareError::invalid_format(
                    "dictionary",
                    format!("unexpected end of data at offset {}", self.pos),
                )
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_string_length(&mut self) -> Result<usize> {
        let head = self.read::<u8>()?;
        if head < 0x80 {
            Ok(usize::from(head))
        } else {
            let low = self.read::<u8>()?;
            Ok((usize::from(head & 0x7F) << 8) | usize::from(low))
        }
    }

    /// Reads a length-prefixed UTF-16LE string.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_string_length()?;
        let bytes = self.read_bytes(len * 2)?;
        let units = bytes
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]));
        char::decode_utf16(units)
            .collect::<Result<String, _>>()
            .map_err(|e| SudareError::invalid_format("dictionary", e.to_string()))
    }

    /// Reads an array of `i32` prefixed with a 1-byte count.
    pub fn read_i32_array(&mut self) -> Result<Vec<i32>> {
        let len = self.read::<u8>()?;
        let mut values = Vec::with_capacity(usize::from(len));
        for _ in 0..len {
            values.push(self.read()?);
        }
        Ok(values)
    }
}

/// Growable little-endian writer.
#[derive(Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    #[inline(always)]
    pub fn write<T: LePrimitive>(&mut self, value: T) {
        value.extend_le(&mut self.buf);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Overwrites a `u32` previously written at `pos`.
    pub fn patch_u32(&mut self, pos: usize, value: u32) {
        self.buf[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn write_string_length(&mut self, len: usize) -> Result<()> {
        if len > MAX_STRING_LENGTH {
            return Err(SudareError::invalid_argument(
                "string",
                format!("length {len} exceeds {MAX_STRING_LENGTH}"),
            ));
        }
        if len < 0x80 {
            self.buf.push(len as u8);
        } else {
            self.buf.push(((len >> 8) as u8) | 0x80);
            self.buf.push((len & 0xFF) as u8);
        }
        Ok(())
    }

    /// Writes a length-prefixed UTF-16LE string.
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        let units: Vec<u16> = s.encode_utf16().collect();
        self.write_string_length(units.len())?;
        for u in units {
            self.write(u);
        }
        Ok(())
    }

    pub fn write_array_length(&mut self, len: usize) -> Result<()> {
        if len > MAX_ARRAY_LENGTH {
            return Err(SudareError::invalid_argument(
                "array",
                format!("length {len} exceeds {MAX_ARRAY_LENGTH}"),
            ));
        }
        self.buf.push(len as u8);
        Ok(())
    }

    pub fn write_i32_array(&mut self, values: &[i32]) -> Result<()> {
        self.write_array_length(values.len())?;
        for &v in values {
            self.write(v);
        }
        Ok(())
    }

    pub fn write_u32_array(&mut self, values: &[u32]) -> Result<()> {
        self.write_array_length(values.len())?;
        for &v in values {
            self.write(v);
        }
        Ok(())
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    #[allow(clippy::missing_const_for_fn)]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_string() {
        let mut w = ByteWriter::new();
        w.write_string("東京").unwrap();
        assert_eq!(w.as_slice(), &[2, 0x71, 0x67, 0xac, 0x4e]);
        let data = w.into_inner();
        let mut r = ByteReader::new(&data, 0);
        assert_eq!(r.read_string().unwrap(), "東京");
        assert_eq!(r.position(), 5);
    }

    #[test]
    fn test_long_string_length() {
        let s = "a".repeat(300);
        let mut w = ByteWriter::new();
        w.write_string(&s).unwrap();
        assert_eq!(&w.as_slice()[..2], &[0x81, 0x2c]);
        let data = w.into_inner();
        let mut r = ByteReader::new(&data, 0);
        assert_eq!(r.read_string().unwrap(), s);
    }

    #[test]
    fn test_surrogate_pair() {
        let mut w = ByteWriter::new();
        w.write_string("😀").unwrap();
        assert_eq!(w.as_slice()[0], 2);
        let data = w.into_inner();
        assert_eq!(ByteReader::new(&data, 0).read_string().unwrap(), "😀");
    }

    #[test]
    fn test_too_long_string() {
        let s = "a".repeat(MAX_STRING_LENGTH + 1);
        let mut w = ByteWriter::new();
        assert!(w.write_string(&s).is_err());
    }

    #[test]
    fn test_too_long_array() {
        let values = vec![0; MAX_ARRAY_LENGTH + 1];
        let mut w = ByteWriter::new();
        assert!(w.write_i32_array(&values).is_err());
        assert!(w.write_i32_array(&values[1..]).is_ok());
    }

    #[test]
    fn test_truncated() {
        let data = [3, 0x61, 0x00];
        let mut r = ByteReader::new(&data, 0);
        assert!(r.read_string().is_err());
    }

    #[test]
    fn test_read_at() {
        let data = [0xff, 1, 0, 2, 0];
        assert_eq!(read_at::<u16>(&data, 1, 0), Some(1));
        assert_eq!(read_at::<u16>(&data, 1, 1), Some(2));
        assert_eq!(read_at::<u16>(&data, 1, 2), None);
    }
}

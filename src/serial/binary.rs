//! Little-endian binary stream codec
//!
//! Fields are written in a fixed order with no version tag and no framing.
//! Strings carry a 7-bit variable-length byte count followed by UTF-8 bytes;
//! every other primitive is fixed-width little-endian.

use std::io::{Read, Write};
use std::time::Duration;

use glam::Vec2;

use super::SerialError;

/// Longest string accepted by the reader (in bytes)
const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Objects with a lossless binary representation.
///
/// `load_binary` must read fields in exactly the order `save_binary`
/// wrote them. Implementations commit the loaded state only after every
/// field decoded successfully.
pub trait BinarySerialize {
    /// Write this object to the stream
    fn save_binary(&self, writer: &mut BinaryWriter<'_>) -> Result<(), SerialError>;

    /// Replace this object's state with one read from the stream
    fn load_binary(&mut self, reader: &mut BinaryReader<'_>) -> Result<(), SerialError>;
}

/// Primitive writer over any byte sink
pub struct BinaryWriter<'a> {
    inner: &'a mut dyn Write,
}

impl<'a> BinaryWriter<'a> {
    /// Wrap a byte sink
    pub fn new(inner: &'a mut dyn Write) -> Self {
        Self { inner }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        self.inner.write_all(bytes).map_err(SerialError::from)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), SerialError> {
        self.put(&[u8::from(value)])
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), SerialError> {
        self.put(&[value])
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), SerialError> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), SerialError> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<(), SerialError> {
        self.put(&value.to_le_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<(), SerialError> {
        self.put(&value.to_le_bytes())
    }

    /// Write a vector as two consecutive `f32`s (x then y)
    pub fn write_vec2(&mut self, value: Vec2) -> Result<(), SerialError> {
        self.write_f32(value.x)?;
        self.write_f32(value.y)
    }

    /// Write a duration as whole nanoseconds
    pub fn write_duration(&mut self, value: Duration) -> Result<(), SerialError> {
        let nanos = u64::try_from(value.as_nanos())
            .map_err(|_| SerialError::InvalidData(format!("duration {value:?} out of range")))?;
        self.write_u64(nanos)
    }

    /// Write a collection length as an `i32`
    pub fn write_len(&mut self, len: usize) -> Result<(), SerialError> {
        let len = i32::try_from(len)
            .map_err(|_| SerialError::InvalidData(format!("length {len} out of range")))?;
        self.write_i32(len)
    }

    /// Write a 7-bit length-prefixed UTF-8 string
    pub fn write_string(&mut self, value: &str) -> Result<(), SerialError> {
        let mut len = value.len();
        while len >= 0x80 {
            self.write_u8((len as u8 & 0x7f) | 0x80)?;
            len >>= 7;
        }
        self.write_u8(len as u8)?;
        self.put(value.as_bytes())
    }

    /// Flush the underlying sink
    pub fn flush(&mut self) -> Result<(), SerialError> {
        self.inner.flush().map_err(SerialError::from)
    }
}

/// Primitive reader over any byte source
pub struct BinaryReader<'a> {
    inner: &'a mut dyn Read,
}

impl<'a> BinaryReader<'a> {
    /// Wrap a byte source
    pub fn new(inner: &'a mut dyn Read) -> Self {
        Self { inner }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], SerialError> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_bool(&mut self) -> Result<bool, SerialError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SerialError::InvalidData(format!(
                "byte {other} is not a boolean"
            ))),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, SerialError> {
        Ok(self.take::<1>()?[0])
    }

    pub fn read_i32(&mut self) -> Result<i32, SerialError> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, SerialError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, SerialError> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, SerialError> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    pub fn read_vec2(&mut self) -> Result<Vec2, SerialError> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        Ok(Vec2::new(x, y))
    }

    pub fn read_duration(&mut self) -> Result<Duration, SerialError> {
        Ok(Duration::from_nanos(self.read_u64()?))
    }

    /// Read a collection length written by [`BinaryWriter::write_len`]
    pub fn read_len(&mut self) -> Result<usize, SerialError> {
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| SerialError::InvalidData(format!("negative length {len}")))
    }

    pub fn read_string(&mut self) -> Result<String, SerialError> {
        let mut len = 0usize;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            len |= usize::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift > 28 {
                return Err(SerialError::InvalidData(
                    "string length prefix is too long".to_string(),
                ));
            }
        }
        if len > MAX_STRING_LEN {
            return Err(SerialError::InvalidData(format!(
                "string length {len} exceeds limit"
            )));
        }

        let mut bytes = vec![0u8; len];
        self.inner.read_exact(&mut bytes)?;
        String::from_utf8(bytes).map_err(|e| SerialError::InvalidData(e.to_string()))
    }
}

/// Serialize an object into a fresh byte buffer
pub fn to_bytes<T: BinarySerialize + ?Sized>(value: &T) -> Result<Vec<u8>, SerialError> {
    let mut buf = Vec::new();
    value.save_binary(&mut BinaryWriter::new(&mut buf))?;
    Ok(buf)
}

/// Load an object's state from a byte slice
pub fn load_bytes<T: BinarySerialize + ?Sized>(
    target: &mut T,
    mut bytes: &[u8],
) -> Result<(), SerialError> {
    target.load_binary(&mut BinaryReader::new(&mut bytes))
}

//! ## skarv-hal::descriptor
//! Opaque buffer descriptors and the fixed-offset codec used at the
//! platform-module boundary.
//!
//! A [`BufferDescriptor`] is caller-owned and backend-interpreted: the
//! allocation front end passes it through byte-for-byte and never looks
//! inside. Only backends (and callers building requests) use the
//! [`DescriptorInfo`] codec.

use bytes::Bytes;
use thiserror::Error;

/// Magic word opening every encoded descriptor ("SKD1" little-endian).
pub const DESCRIPTOR_MAGIC: u32 = 0x3144_4b53;

/// Exact length of an encoded descriptor in bytes.
pub const DESCRIPTOR_LEN: usize = 28;

/// Errors that can occur while decoding a buffer descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("descriptor truncated: {0} bytes, expected {DESCRIPTOR_LEN}")]
    Truncated(usize),
    #[error("descriptor carries trailing bytes: {0} bytes, expected {DESCRIPTOR_LEN}")]
    TrailingBytes(usize),
    #[error("bad descriptor magic {0:#010x}")]
    BadMagic(u32),
    #[error("descriptor requests a zero-sized buffer")]
    ZeroDimension,
}

/// An opaque description of desired buffer properties.
///
/// Immutable and caller-owned; it has no lifecycle beyond the allocation
/// call it is passed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferDescriptor(Bytes);

impl BufferDescriptor {
    pub fn new(raw: Bytes) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for BufferDescriptor {
    fn from(raw: Vec<u8>) -> Self {
        Self(Bytes::from(raw))
    }
}

/// The decoded form of a descriptor.
///
/// `format` is a raw platform code; skarv assigns it no meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorInfo {
    pub width: u32,
    pub height: u32,
    pub format: u32,
    pub layer_count: u32,
    pub usage: u64,
}

impl DescriptorInfo {
    /// Encodes this request into the opaque wire form callers hand to the
    /// allocation front end.
    pub fn encode(&self) -> BufferDescriptor {
        let mut raw = Vec::with_capacity(DESCRIPTOR_LEN);
        raw.extend_from_slice(&DESCRIPTOR_MAGIC.to_le_bytes());
        raw.extend_from_slice(&self.width.to_le_bytes());
        raw.extend_from_slice(&self.height.to_le_bytes());
        raw.extend_from_slice(&self.format.to_le_bytes());
        raw.extend_from_slice(&self.layer_count.to_le_bytes());
        raw.extend_from_slice(&self.usage.to_le_bytes());
        BufferDescriptor(Bytes::from(raw))
    }

    /// Decodes an opaque descriptor. Backends call this; the front end must
    /// not.
    pub fn decode(descriptor: &BufferDescriptor) -> Result<Self, DescriptorError> {
        let raw = descriptor.as_bytes();
        if raw.len() < DESCRIPTOR_LEN {
            return Err(DescriptorError::Truncated(raw.len()));
        }
        if raw.len() > DESCRIPTOR_LEN {
            return Err(DescriptorError::TrailingBytes(raw.len()));
        }

        let magic = read_u32(raw, 0);
        if magic != DESCRIPTOR_MAGIC {
            return Err(DescriptorError::BadMagic(magic));
        }

        let info = Self {
            width: read_u32(raw, 4),
            height: read_u32(raw, 8),
            format: read_u32(raw, 12),
            layer_count: read_u32(raw, 16),
            usage: read_u64(raw, 20),
        };
        if info.width == 0 || info.height == 0 || info.layer_count == 0 {
            return Err(DescriptorError::ZeroDimension);
        }
        Ok(info)
    }
}

fn read_u32(raw: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]])
}

fn read_u64(raw: &[u8], at: usize) -> u64 {
    u64::from_le_bytes([
        raw[at],
        raw[at + 1],
        raw[at + 2],
        raw[at + 3],
        raw[at + 4],
        raw[at + 5],
        raw[at + 6],
        raw[at + 7],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DescriptorInfo {
        DescriptorInfo {
            width: 1024,
            height: 768,
            format: 1,
            layer_count: 1,
            usage: 0x30,
        }
    }

    #[test]
    fn encode_then_decode() {
        let descriptor = sample().encode();
        assert_eq!(descriptor.len(), DESCRIPTOR_LEN);
        assert_eq!(DescriptorInfo::decode(&descriptor), Ok(sample()));
    }

    #[test]
    fn truncated_descriptor_rejected() {
        let descriptor = BufferDescriptor::from(vec![0u8; 11]);
        assert_eq!(
            DescriptorInfo::decode(&descriptor),
            Err(DescriptorError::Truncated(11))
        );
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut raw = sample().encode().as_bytes().to_vec();
        raw.push(0xff);
        assert_eq!(
            DescriptorInfo::decode(&BufferDescriptor::from(raw)),
            Err(DescriptorError::TrailingBytes(DESCRIPTOR_LEN + 1))
        );
    }

    #[test]
    fn bad_magic_rejected() {
        let mut raw = sample().encode().as_bytes().to_vec();
        raw[0] = 0x00;
        let err = DescriptorInfo::decode(&BufferDescriptor::from(raw)).unwrap_err();
        assert!(matches!(err, DescriptorError::BadMagic(_)));
    }

    #[test]
    fn zero_dimension_rejected() {
        let mut info = sample();
        info.height = 0;
        assert_eq!(
            DescriptorInfo::decode(&info.encode()),
            Err(DescriptorError::ZeroDimension)
        );
    }
}

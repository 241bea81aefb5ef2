//! Byte ranges and payload clipping

use crate::error::{Error, Result};

/// Half-open byte range `[start, end)` inside a cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u32,
    end: u32,
}

impl ByteRange {
    /// Create a range; `start` must not lie after `end`
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange);
        }
        Ok(Self { start, end })
    }

    /// Create a range from a start offset and a length
    pub fn with_len(start: u32, len: usize) -> Result<Self> {
        let len = u32::try_from(len).map_err(|_| Error::InvalidRange)?;
        let end = start.checked_add(len).ok_or(Error::InvalidRange)?;
        Ok(Self { start, end })
    }

    /// First offset in the range
    pub fn start(&self) -> u32 {
        self.start
    }

    /// One past the last offset in the range
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of bytes covered
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Whether the range covers no bytes
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check that the range fits in a cart of `capacity` bytes
    pub fn check_within(&self, capacity: u32) -> Result<()> {
        if self.end > capacity {
            return Err(Error::AddressOutOfBounds);
        }
        Ok(())
    }

    /// Shrink the range so it ends no later than `capacity`
    pub fn clamp_to(&self, capacity: u32) -> Self {
        let end = self.end.min(capacity);
        Self {
            start: self.start.min(end),
            end,
        }
    }
}

/// Clip a write payload to at most `limit` bytes
///
/// Oversized payloads are truncated, never rejected.
pub fn clip_payload(data: &[u8], limit: usize) -> &[u8] {
    if data.len() > limit {
        log::debug!(
            "clipping {} byte payload to {} bytes",
            data.len(),
            limit
        );
        &data[..limit]
    } else {
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_validation() {
        assert_eq!(ByteRange::new(4, 2), Err(Error::InvalidRange));
        assert!(ByteRange::new(2, 2).unwrap().is_empty());
        assert_eq!(ByteRange::with_len(10, 6).unwrap().end(), 16);
        assert_eq!(ByteRange::with_len(u32::MAX, 2), Err(Error::InvalidRange));
    }

    #[test]
    fn test_check_within_capacity() {
        let range = ByteRange::new(0, 64).unwrap();
        assert!(range.check_within(64).is_ok());
        assert_eq!(range.check_within(32), Err(Error::AddressOutOfBounds));
        assert_eq!(range.clamp_to(32), ByteRange::new(0, 32).unwrap());
        assert_eq!(
            ByteRange::new(40, 64).unwrap().clamp_to(32),
            ByteRange::new(32, 32).unwrap()
        );
    }

    #[test]
    fn test_clip_payload() {
        let data = [7u8; 100];
        assert_eq!(clip_payload(&data, 64).len(), 64);
        assert_eq!(clip_payload(&data[..10], 64), &data[..10]);
        assert!(clip_payload(&[], 64).is_empty());
    }
}

//! Adapter for embedded-hal 1.0 blocking I2C buses

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use maybe_async::maybe_async;

use crate::bus::traits::I2cBus;
use crate::error::{Error, Result};

/// Default transaction size limit for HAL buses, which have none of their own
const DEFAULT_MAX_LEN: usize = 32;

/// Wraps any `embedded_hal::i2c::I2c` implementation as an [`I2cBus`]
pub struct EhBus<I> {
    i2c: I,
    max_len: usize,
}

impl<I: I2c> EhBus<I> {
    /// Wrap `i2c` with the default transaction size limit
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            max_len: DEFAULT_MAX_LEN,
        }
    }

    /// Override the per-transaction size limit (at least 3 bytes)
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.max(3);
        self
    }

    /// Return the wrapped bus
    pub fn release(self) -> I {
        self.i2c
    }
}

fn map_err<E: embedded_hal::i2c::Error>(e: E) -> Error {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => Error::Nack,
        kind => {
            log::trace!("i2c: {:?}", kind);
            Error::BusFault
        }
    }
}

#[maybe_async(AFIT)]
impl<I: I2c> I2cBus for EhBus<I> {
    fn max_read_len(&self) -> usize {
        self.max_len
    }

    fn max_write_len(&self) -> usize {
        self.max_len
    }

    async fn write(&mut self, address: u8, data: &[u8]) -> Result<()> {
        self.i2c.write(address, data).map_err(map_err)
    }

    async fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<()> {
        self.i2c.read(address, buf).map_err(map_err)
    }

    async fn write_read(&mut self, address: u8, data: &[u8], buf: &mut [u8]) -> Result<()> {
        self.i2c.write_read(address, data, buf).map_err(map_err)
    }
}

#[cfg(all(test, feature = "is_sync"))]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, NoAcknowledgeSource, Operation, SevenBitAddress};

    #[derive(Debug)]
    struct FakeError(ErrorKind);

    impl embedded_hal::i2c::Error for FakeError {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    /// Answers only at 0x50, fails with arbitration loss at 0x51
    struct FakeI2c;

    impl ErrorType for FakeI2c {
        type Error = FakeError;
    }

    impl I2c<SevenBitAddress> for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> core::result::Result<(), Self::Error> {
            match address {
                0x50 => {
                    for op in operations {
                        if let Operation::Read(buf) = op {
                            buf.fill(0x42);
                        }
                    }
                    Ok(())
                }
                0x51 => Err(FakeError(ErrorKind::ArbitrationLoss)),
                _ => Err(FakeError(ErrorKind::NoAcknowledge(
                    NoAcknowledgeSource::Address,
                ))),
            }
        }
    }

    #[test]
    fn test_error_mapping() {
        let mut bus = EhBus::new(FakeI2c);
        assert_eq!(bus.probe(0x50), Ok(()));
        assert_eq!(bus.probe(0x60), Err(Error::Nack));
        assert_eq!(bus.write(0x51, &[0]), Err(Error::BusFault));

        let mut buf = [0u8; 2];
        bus.write_read(0x50, &[0, 0], &mut buf).unwrap();
        assert_eq!(buf, [0x42, 0x42]);
    }
}

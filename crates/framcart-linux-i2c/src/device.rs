//! Linux I2C device implementation
//!
//! This module provides the `LinuxI2c` struct that implements the `I2cBus`
//! trait using Linux's i2c-dev interface.

use crate::error::{LinuxI2cError, Result};

use framcart_core::bus::I2cBus;
use framcart_core::error::{Error as CoreError, Result as CoreResult};

use nix::errno::Errno;
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Largest message the kernel accepts in one I2C_RDWR segment
const MAX_MSG_LEN: usize = 8192;

/// Adapter functionality bits (from `linux/i2c.h`)
pub mod funcs {
    /// Plain I2C-level commands (I2C_RDWR)
    pub const I2C: u64 = 0x0000_0001;
    /// SMBus quick command
    pub const SMBUS_QUICK: u64 = 0x0001_0000;
}

/// Linux i2c-dev ioctl constants
mod ioctl {
    use nix::{ioctl_read_bad, ioctl_write_int_bad, ioctl_write_ptr_bad};

    // i2c-dev uses plain request numbers, not _IOC-encoded ones
    const I2C_SLAVE_FORCE: u16 = 0x0706;
    const I2C_FUNCS: u16 = 0x0705;
    const I2C_RDWR: u16 = 0x0707;
    const I2C_SMBUS: u16 = 0x0720;

    /// Message flag: this segment reads from the device
    pub const I2C_M_RD: u16 = 0x0001;

    pub const I2C_SMBUS_WRITE: u8 = 0;
    pub const I2C_SMBUS_QUICK: u32 = 0;

    /// struct i2c_msg
    #[repr(C)]
    pub struct I2cMsg {
        pub addr: u16,
        pub flags: u16,
        pub len: u16,
        pub buf: *mut u8,
    }

    /// struct i2c_rdwr_ioctl_data
    #[repr(C)]
    pub struct I2cRdwrIoctlData {
        pub msgs: *mut I2cMsg,
        pub nmsgs: u32,
    }

    /// struct i2c_smbus_ioctl_data
    #[repr(C)]
    pub struct I2cSmbusIoctlData {
        pub read_write: u8,
        pub command: u8,
        pub size: u32,
        pub data: *mut u8,
    }

    ioctl_write_int_bad!(i2c_slave_force, I2C_SLAVE_FORCE);
    ioctl_read_bad!(i2c_funcs, I2C_FUNCS, libc::c_ulong);
    ioctl_write_ptr_bad!(i2c_rdwr, I2C_RDWR, I2cRdwrIoctlData);
    ioctl_write_ptr_bad!(i2c_smbus, I2C_SMBUS, I2cSmbusIoctlData);
}

use ioctl::{I2cMsg, I2cRdwrIoctlData, I2cSmbusIoctlData};

/// Configuration for opening a Linux I2C adapter
#[derive(Debug, Clone, Default)]
pub struct LinuxI2cConfig {
    /// Device path (e.g., "/dev/i2c-1")
    pub device: String,
    /// Cap on bytes per transaction (default: kernel maximum)
    pub max_len: Option<usize>,
}

impl LinuxI2cConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Cap the number of bytes per transaction
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}

/// Linux I2C adapter using the i2c-dev interface
pub struct LinuxI2c {
    file: File,
    funcs: u64,
    max_len: usize,
}

/// Map an ioctl failure to the core transport errors
fn transfer_error(errno: Errno) -> CoreError {
    match errno {
        // No ACK on the address byte, or on a data byte
        Errno::ENXIO | Errno::EREMOTEIO => CoreError::Nack,
        other => {
            log::debug!("linux_i2c: transfer failed: {}", other);
            CoreError::BusFault
        }
    }
}

impl LinuxI2c {
    /// Open a Linux I2C adapter with the given configuration
    pub fn open(config: &LinuxI2cConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxI2cError::NoDevice);
        }

        log::debug!("linux_i2c: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxI2cError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let mut funcs: libc::c_ulong = 0;
        unsafe {
            ioctl::i2c_funcs(file.as_raw_fd(), &mut funcs).map_err(|e| {
                LinuxI2cError::FuncsFailed {
                    path: config.device.clone(),
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }
        let funcs = funcs as u64;
        if funcs & funcs::I2C == 0 {
            return Err(LinuxI2cError::Unsupported(config.device.clone()));
        }

        let max_len = config
            .max_len
            .unwrap_or(MAX_MSG_LEN)
            .clamp(3, MAX_MSG_LEN);

        log::info!(
            "linux_i2c: Opened {} (funcs=0x{:08X}, max {} bytes/transfer)",
            config.device,
            funcs,
            max_len
        );

        Ok(Self {
            file,
            funcs,
            max_len,
        })
    }

    /// Open a device with default settings
    pub fn open_device(device: &str) -> Result<Self> {
        Self::open(&LinuxI2cConfig::new(device))
    }

    /// Adapter functionality bits as reported by the kernel
    pub fn funcs(&self) -> u64 {
        self.funcs
    }

    /// Run one combined transfer of up to two segments
    fn rdwr(&mut self, msgs: &mut [I2cMsg]) -> CoreResult<()> {
        let data = I2cRdwrIoctlData {
            msgs: msgs.as_mut_ptr(),
            nmsgs: msgs.len() as u32,
        };
        unsafe { ioctl::i2c_rdwr(self.file.as_raw_fd(), &data) }
            .map(|_| ())
            .map_err(transfer_error)
    }

    fn check_len(&self, len: usize) -> CoreResult<u16> {
        if len > self.max_len {
            log::debug!("linux_i2c: {} byte transfer exceeds {}", len, self.max_len);
            return Err(CoreError::BusFault);
        }
        Ok(len as u16)
    }

    fn smbus_quick(&mut self, address: u8) -> CoreResult<()> {
        let data = I2cSmbusIoctlData {
            read_write: ioctl::I2C_SMBUS_WRITE,
            command: 0,
            size: ioctl::I2C_SMBUS_QUICK,
            data: std::ptr::null_mut(),
        };
        // SMBus commands address the slave set with I2C_SLAVE; the forced
        // variant also works when a kernel driver is bound to it
        let fd = self.file.as_raw_fd();
        unsafe { ioctl::i2c_slave_force(fd, address as libc::c_int) }.map_err(transfer_error)?;
        unsafe { ioctl::i2c_smbus(fd, &data) }
            .map(|_| ())
            .map_err(transfer_error)
    }
}

impl I2cBus for LinuxI2c {
    fn max_read_len(&self) -> usize {
        self.max_len
    }

    fn max_write_len(&self) -> usize {
        self.max_len
    }

    fn write(&mut self, address: u8, data: &[u8]) -> CoreResult<()> {
        let len = self.check_len(data.len())?;
        let mut msgs = [I2cMsg {
            addr: address as u16,
            flags: 0,
            len,
            // The kernel only reads from write segments
            buf: data.as_ptr() as *mut u8,
        }];
        self.rdwr(&mut msgs)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> CoreResult<()> {
        let len = self.check_len(buf.len())?;
        let mut msgs = [I2cMsg {
            addr: address as u16,
            flags: ioctl::I2C_M_RD,
            len,
            buf: buf.as_mut_ptr(),
        }];
        self.rdwr(&mut msgs)
    }

    fn write_read(&mut self, address: u8, data: &[u8], buf: &mut [u8]) -> CoreResult<()> {
        let write_len = self.check_len(data.len())?;
        let read_len = self.check_len(buf.len())?;
        let mut msgs = [
            I2cMsg {
                addr: address as u16,
                flags: 0,
                len: write_len,
                buf: data.as_ptr() as *mut u8,
            },
            I2cMsg {
                addr: address as u16,
                flags: ioctl::I2C_M_RD,
                len: read_len,
                buf: buf.as_mut_ptr(),
            },
        ];
        self.rdwr(&mut msgs)
    }

    fn probe(&mut self, address: u8) -> CoreResult<()> {
        if self.funcs & funcs::SMBUS_QUICK != 0 {
            self.smbus_quick(address)
        } else {
            // Same fallback as i2cdetect -r: a one-byte read
            let mut byte = [0u8; 1];
            self.read(address, &mut byte)
        }
    }
}

/// Parse bus options from a list of key-value pairs
///
/// - `dev=/dev/i2c-N` - device path
/// - `bus=N` - shorthand for `dev=/dev/i2c-N`
/// - `maxlen=N` - cap bytes per transaction
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxI2cConfig, String> {
    let mut config = LinuxI2cConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "bus" => {
                let bus: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid bus number: {}", value))?;
                config.device = format!("/dev/i2c-{}", bus);
            }
            "maxlen" => {
                let max_len: usize = value
                    .parse()
                    .map_err(|_| format!("Invalid maxlen value: {}", value))?;
                if !(3..=MAX_MSG_LEN).contains(&max_len) {
                    return Err(format!(
                        "Invalid maxlen: {} (must be 3-{})",
                        max_len, MAX_MSG_LEN
                    ));
                }
                config.max_len = Some(max_len);
            }
            _ => {
                log::warn!("linux_i2c: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err("No device specified. Use dev=/dev/i2c-N".to_string());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("dev", "/dev/i2c-3")]).unwrap();
        assert_eq!(config.device, "/dev/i2c-3");
        assert_eq!(config.max_len, None);

        let config = parse_options(&[("bus", "1"), ("maxlen", "32")]).unwrap();
        assert_eq!(config.device, "/dev/i2c-1");
        assert_eq!(config.max_len, Some(32));
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(parse_options(&[]).is_err());
        assert!(parse_options(&[("bus", "x")]).is_err());
        assert!(parse_options(&[("dev", "/dev/i2c-1"), ("maxlen", "2")]).is_err());
    }

    #[test]
    fn test_errno_mapping() {
        assert_eq!(transfer_error(Errno::ENXIO), CoreError::Nack);
        assert_eq!(transfer_error(Errno::EREMOTEIO), CoreError::Nack);
        assert_eq!(transfer_error(Errno::ETIMEDOUT), CoreError::BusFault);
        assert_eq!(transfer_error(Errno::EAGAIN), CoreError::BusFault);
    }

    #[test]
    fn test_open_missing_device() {
        assert!(matches!(
            LinuxI2c::open_device("/nonexistent/i2c-99"),
            Err(LinuxI2cError::OpenFailed { .. })
        ));
        assert!(matches!(
            LinuxI2c::open(&LinuxI2cConfig::default()),
            Err(LinuxI2cError::NoDevice)
        ));
    }
}

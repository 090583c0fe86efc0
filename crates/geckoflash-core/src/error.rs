//! Error types for geckoflash-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Target errors
    /// Target CPU must be halted for flash operations
    TargetNotHalted,
    /// Target memory access failed
    MemoryAccess {
        /// Address of the failed access
        addr: u32,
    },
    /// No scratch memory available on the target
    ResourceExhausted,
    /// On-target flash routine reported a hardware abort
    AlgorithmFailed,

    // Probe errors
    /// Attached CPU core is not a supported Cortex-M (part number)
    UnsupportedCore(u16),
    /// Legacy family id is not in the device table
    UnknownFamily(u8),
    /// Device belongs to a series this driver does not handle
    UnsupportedSeries {
        /// Legacy family id
        family: u8,
        /// Series (generation) of the family
        series: u8,
    },
    /// Part family code in the device info is not recognized
    UnknownPartFamily(u8),
    /// Page size exponent in the device info gives an unsupported size
    InvalidPageSize(u8),
    /// Device info reports a flash size that yields no pages
    InvalidFlashSize,

    // Bank errors
    /// Bank base address is not a known flash region
    UnsupportedBankBase(u32),
    /// Bank has not been probed
    BankNotProbed,
    /// Sector index beyond the bank's sector table
    SectorOutOfRange,
    /// Access extends beyond the bank
    AddressOutOfBounds,

    // Controller errors
    /// Controller rejected the address as invalid
    AddressInvalid {
        /// Rejected address
        addr: u32,
    },
    /// Controller reported the page as locked
    PageLocked {
        /// Address within the locked page
        addr: u32,
    },
    /// Controller status poll timed out
    Timeout,
    /// Destination address is not 4-byte aligned
    AlignmentViolation {
        /// Offending address
        addr: u32,
    },
    /// Flash operation failed for an unspecified reason
    OperationFailed {
        /// Address where the operation stopped
        addr: u32,
    },

    // Protection errors
    /// Lock words may only be changed through the protect path
    LockWordsReadOnly,
    /// Protection of the user data and lock bits pages is not supported
    ProtectUnsupported,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotHalted => write!(f, "target not halted"),
            Self::MemoryAccess { addr } => {
                write!(f, "target memory access failed at 0x{:08X}", addr)
            }
            Self::ResourceExhausted => write!(f, "no working area available on target"),
            Self::AlgorithmFailed => write!(f, "flash routine aborted on target"),
            Self::UnsupportedCore(partno) => {
                write!(f, "target is not a supported Cortex-M device (part 0x{:03X})", partno)
            }
            Self::UnknownFamily(id) => write!(f, "unknown MCU family {}", id),
            Self::UnsupportedSeries { family, series } => write!(
                f,
                "series {} MCU detected (family {}); only series 2 is supported",
                series, family
            ),
            Self::UnknownPartFamily(code) => write!(f, "unknown MCU part family {}", code),
            Self::InvalidPageSize(exp) => {
                write!(f, "invalid flash page size (exponent {})", exp)
            }
            Self::InvalidFlashSize => write!(f, "invalid flash size"),
            Self::UnsupportedBankBase(base) => {
                write!(f, "flash bank with base address 0x{:08X} is not supported", base)
            }
            Self::BankNotProbed => write!(f, "flash bank not probed"),
            Self::SectorOutOfRange => write!(f, "sector out of range"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::AddressInvalid { addr } => write!(f, "invalid address 0x{:08X}", addr),
            Self::PageLocked { addr } => write!(f, "page at 0x{:08X} is locked", addr),
            Self::Timeout => write!(f, "timed out waiting for MSC status"),
            Self::AlignmentViolation { addr } => {
                write!(f, "address 0x{:08X} breaks required 4-byte alignment", addr)
            }
            Self::OperationFailed { addr } => {
                write!(f, "flash operation failed at address 0x{:08X}", addr)
            }
            Self::LockWordsReadOnly => write!(f, "cannot write to lock words"),
            Self::ProtectUnsupported => {
                write!(f, "locking user data and lock bits pages is not supported")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

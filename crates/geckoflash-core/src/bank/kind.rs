//! Bank kinds

use core::fmt;

use crate::device::regions;
use crate::error::{Error, Result};

/// Default main flash base
pub const MAIN_FLASH_BASE: u32 = regions::FLASH_BASE;
/// User data page base
pub const USER_DATA_BASE: u32 = regions::USER_DATA;
/// Lock bits page base
pub const LOCK_BITS_BASE: u32 = regions::LOCK_BITS;

/// Flash region a bank covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankKind {
    /// Main flash array
    Main,
    /// User data page
    UserData,
    /// Lock bits page
    LockBits,
}

impl BankKind {
    /// Number of bank kinds
    pub const COUNT: usize = 3;

    /// Classify a bank by base address
    pub fn from_base(base: u32) -> Result<Self> {
        match base {
            regions::FLASH_BASE | regions::FLASH_BASE_G23 => Ok(Self::Main),
            regions::USER_DATA => Ok(Self::UserData),
            regions::LOCK_BITS => Ok(Self::LockBits),
            other => Err(Error::UnsupportedBankBase(other)),
        }
    }

    /// Slot of this kind in per-bank tables
    pub const fn index(self) -> usize {
        match self {
            Self::Main => 0,
            Self::UserData => 1,
            Self::LockBits => 2,
        }
    }
}

impl fmt::Display for BankKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main flash"),
            Self::UserData => write!(f, "user data"),
            Self::LockBits => write!(f, "lock bits"),
        }
    }
}

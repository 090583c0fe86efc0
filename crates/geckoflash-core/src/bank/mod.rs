//! Flash banks and the shared controller session
//!
//! A Series 2 chip exposes three banks (main flash, user data page, lock
//! bits page) that all drive the same MSC. Banks attached to one target
//! share a reference-counted [`BankSession`] holding the device profile and
//! the lock bits mirror.

mod flash_bank;
mod kind;
mod session;

pub use flash_bank::{FlashBank, Sector};
pub use kind::{BankKind, LOCK_BITS_BASE, MAIN_FLASH_BASE, USER_DATA_BASE};
pub use session::{BankSession, SessionRegistry, SharedSession};

//! geckoflash-core - Core library for EFM32/EFR32 Series 2 flash programming
//!
//! This crate drives the on-chip flash controller (MSC) of Silicon Labs
//! Series 2 parts through a debug host that can already read and write
//! target memory. It is `no_std` compatible; heap allocation is required
//! for sector tables and padded write buffers.
//!
//! # Features
//!
//! - `std` - Enable standard library support (`std::error::Error`, serde
//!   derives for configuration types)
//!
//! # Example
//!
//! ```ignore
//! use geckoflash_core::bank::{SessionRegistry, MAIN_FLASH_BASE};
//! use geckoflash_core::FlashOptions;
//!
//! fn program<T: Target>(target: &mut T, image: &[u8]) -> geckoflash_core::Result<()> {
//!     let mut registry = SessionRegistry::new(FlashOptions::default());
//!     let mut bank = registry.attach(target, MAIN_FLASH_BASE)?;
//!     bank.probe(target)?;
//!     bank.erase(target, 0, 3)?;
//!     bank.write(target, 0, image)
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bank;
pub mod config;
pub mod device;
pub mod error;
pub mod lockbits;
pub mod msc;
pub mod target;

pub use config::FlashOptions;
pub use error::{Error, Result};

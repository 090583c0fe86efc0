//! Target access traits and abstractions
//!
//! This module defines the capability a debug host must provide so the
//! driver can reach the target chip's memory, scratch RAM and CPU.

mod core_type;
#[cfg(test)]
pub(crate) mod mock;
mod traits;

pub use core_type::CoreType;
pub use traits::*;

//! MSC register map

use bitflags::bitflags;

/// Default MSC register block base on Series 2
pub const MSC_BASE: u32 = 0x4003_0000;

/// Write control register
pub const WRITECTRL: u32 = 0x00C;
/// Write enable bit in WRITECTRL
pub const WRITECTRL_WREN: u32 = 0x1;

/// Write command register
pub const WRITECMD: u32 = 0x010;
/// Latch ADDRB into the internal address register
pub const WRITECMD_LADDRIM: u32 = 0x1;
/// Erase the page at the latched address
pub const WRITECMD_ERASEPAGE: u32 = 0x2;
/// Write WDATA to the latched address
pub const WRITECMD_WRITEONCE: u32 = 0x8;

/// Address buffer register
pub const ADDRB: u32 = 0x014;
/// Write data register
pub const WDATA: u32 = 0x018;
/// Status register
pub const STATUS: u32 = 0x01C;

/// Configuration lock register
pub const LOCK: u32 = 0x03C;
/// Value written to LOCK to unlock the MSC
pub const LOCK_KEY: u32 = 0x1B71;

bitflags! {
    /// MSC STATUS register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MscStatus: u32 {
        /// Erase or write in progress
        const BUSY = 0x01;
        /// Access to a locked page was attempted
        const LOCKED = 0x02;
        /// Latched address is invalid
        const INVADDR = 0x04;
        /// WDATA can accept a new word
        const WDATAREADY = 0x08;
        /// A word write timed out
        const WORDTIMEOUT = 0x10;
        /// Last page erase was aborted
        const ERASEABORTED = 0x20;
    }
}

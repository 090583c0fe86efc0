//! Driver configuration
//!
//! Poll budgets are counted in liveness ticks, not wall-clock time: each
//! status read that does not satisfy its condition costs one tick.

/// Default poll budget for a page erase
pub const ERASE_TIMEOUT: u32 = 100;
/// Default poll budget while waiting for WDATAREADY
pub const WDATAREADY_TIMEOUT: u32 = 100;
/// Default poll budget for a single word write
pub const WRITE_TIMEOUT: u32 = 100;
/// Initial size of the block write ring buffer
pub const BLOCK_BUFFER_SIZE: u32 = 16384;
/// Ring buffer sizes at or below this give up on block writes
pub const BLOCK_BUFFER_FLOOR: u32 = 256;

/// Tunables for flash operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct FlashOptions {
    /// Poll budget for BUSY to clear after a page erase
    pub erase_timeout: u32,
    /// Poll budget for WDATAREADY before staging a word
    pub wdataready_timeout: u32,
    /// Poll budget for BUSY to clear after a word write
    pub write_timeout: u32,
    /// First ring buffer size tried for block writes, in bytes
    pub block_buffer_size: u32,
    /// Block writes are abandoned once the buffer would shrink to this size
    pub block_buffer_floor: u32,
}

impl Default for FlashOptions {
    fn default() -> Self {
        Self {
            erase_timeout: ERASE_TIMEOUT,
            wdataready_timeout: WDATAREADY_TIMEOUT,
            write_timeout: WRITE_TIMEOUT,
            block_buffer_size: BLOCK_BUFFER_SIZE,
            block_buffer_floor: BLOCK_BUFFER_FLOOR,
        }
    }
}

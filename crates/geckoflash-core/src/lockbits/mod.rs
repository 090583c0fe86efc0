//! Lock bits page management
//!
//! The first 512 bytes of the lock bits page hold 128 lock words. A set bit
//! means unlocked; the erased page therefore unlocks everything. The driver
//! keeps a mirror of the words and only ever rewrites the page as a whole
//! (read trailing data, erase, restore, write mirror), since erasing the
//! page destroys the live protection state.

mod bitmap;

pub use bitmap::{LockBitmap, LOCKWORDS};

/// Lock word indices with a fixed meaning
pub mod word {
    /// Configuration lock word 0
    pub const CLW0: usize = 122;
    /// Configuration lock word 1
    pub const CLW1: usize = 123;
    /// Authentication lock word
    pub const ALW: usize = 124;
    /// Mass erase lock word
    pub const MLW: usize = 125;
    /// User data / lock bits page lock word
    pub const ULW: usize = 126;
    /// Debug lock word
    pub const DLW: usize = 127;

    /// Metadata words, in the order they are read back
    pub const METADATA: [usize; 6] = [ULW, DLW, MLW, ALW, CLW1, CLW0];

    /// ULW bit protecting the user data page
    pub const ULW_USER_DATA: u32 = 0x1;
    /// ULW bit protecting the lock bits page
    pub const ULW_LOCK_BITS: u32 = 0x2;
}

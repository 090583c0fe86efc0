//! Fixed memory map of Series 2 parts

/// Main flash base on most parts
pub const FLASH_BASE: u32 = 0x0000_0000;
/// Main flash base on xG23 parts
pub const FLASH_BASE_G23: u32 = 0x0800_0000;

/// Start of the information block
pub const INFO_BASE: u32 = 0x0FE0_0000;
/// User data page
pub const USER_DATA: u32 = INFO_BASE;
/// Lock bits page
pub const LOCK_BITS: u32 = INFO_BASE + 0x4000;
/// Size of the lock word area at the start of the lock bits page
pub const LOCKWORDS_SIZE: u32 = 512;
/// First byte of the lock bits page after the lock words
pub const LOCK_BITS_EXTRA: u32 = LOCK_BITS + LOCKWORDS_SIZE;
/// Device information page
pub const DEV_INFO: u32 = INFO_BASE + 0x8000;

/// Size of the user data and lock bits banks
pub const AUX_PAGE_SIZE: u32 = 1024;

/// Device information field addresses
pub mod di {
    use super::DEV_INFO;

    /// Product revision (u8)
    pub const PROD_REV: u32 = DEV_INFO + 0x002;
    /// Extended part info word (u32)
    pub const PART: u32 = DEV_INFO + 0x004;
    /// Flash page size exponent (u8)
    pub const PAGE_SIZE: u32 = DEV_INFO + 0x008;
    /// Flash size in KiB (u16)
    pub const FLASH_SIZE: u32 = DEV_INFO + 0x00C;
    /// RAM size in KiB (u16)
    pub const RAM_SIZE: u32 = DEV_INFO + 0x00E;
    /// Legacy family id (u8)
    pub const LEGACY_FAMILY: u32 = DEV_INFO + 0x1FE;
}

/// Clock management unit
pub mod cmu {
    /// CMU register block base
    pub const BASE: u32 = 0x4000_8000;
    /// CLKEN1 set alias
    pub const CLKEN1_SET: u32 = BASE + 0x1068;
    /// MSC clock enable on xG22 and unknown parts
    pub const CLKEN1_MSC_G22: u32 = 1 << 17;
    /// MSC clock enable on xG23
    pub const CLKEN1_MSC_G23: u32 = 1 << 16;
}

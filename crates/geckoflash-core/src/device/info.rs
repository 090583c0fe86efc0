//! Decoded device profile

use core::fmt;

use super::families::DeviceDescriptor;
use crate::error::{Error, Result};

/// Part family letter encoded in the extended part info word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartFamily {
    /// Flex Gecko
    Flex,
    /// Mighty Gecko
    Mighty,
    /// Blue Gecko
    Blue,
    /// Pearl Gecko
    Pearl,
}

impl PartFamily {
    /// Decode the 6-bit family code
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Flex),
            1 => Ok(Self::Mighty),
            2 => Ok(Self::Blue),
            5 => Ok(Self::Pearl),
            other => Err(Error::UnknownPartFamily(other)),
        }
    }

    /// Letter used in part names
    pub const fn letter(&self) -> char {
        match self {
            Self::Flex => 'F',
            Self::Mighty => 'M',
            Self::Blue => 'B',
            Self::Pearl => 'P',
        }
    }
}

/// Fields of the extended part info word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartInfo {
    /// Part family letter
    pub family: PartFamily,
    /// Part family number, e.g. 22 for xG22
    pub family_num: u8,
    /// Device number letter (`'A' + serial / 1000`)
    pub dev_num_letter: char,
    /// Device number digits (`serial % 1000`)
    pub dev_num_digits: u16,
}

/// Decode the extended part info word
///
/// Layout: bits 29:24 family code, 23:16 family number, 15:0 device serial.
pub fn decode_part_info(word: u32) -> Result<PartInfo> {
    let family = PartFamily::from_code(((word >> 24) & 0x3F) as u8)?;
    let family_num = ((word >> 16) & 0xFF) as u8;
    let serial = (word & 0xFFFF) as u16;

    // serial / 1000 is at most 65
    let dev_num_letter = char::from(b'A' + (serial / 1000) as u8);

    Ok(PartInfo {
        family,
        family_num,
        dev_num_letter,
        dev_num_digits: serial % 1000,
    })
}

/// Compute a page size from the device info exponent byte
///
/// Only 2, 4 and 8 KiB pages exist on Series 2 parts; anything else means
/// the info page was misread or the silicon is unsupported.
pub fn page_size_from_exponent(exp: u8) -> Result<u32> {
    let shift = exp.wrapping_add(10);
    let size = 1u32.checked_shl(u32::from(shift)).unwrap_or(0);
    match size {
        2048 | 4096 | 8192 => Ok(size),
        _ => Err(Error::InvalidPageSize(exp)),
    }
}

/// Profile of a probed chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Family descriptor
    pub descriptor: &'static DeviceDescriptor,
    /// Main flash size in KiB
    pub flash_kib: u16,
    /// RAM size in KiB
    pub ram_kib: u16,
    /// Legacy family id
    pub legacy_family: u8,
    /// Decoded part info
    pub part: PartInfo,
    /// Silicon revision
    pub prod_rev: u8,
    /// Main flash page size in bytes
    pub page_size: u32,
    /// MSC register block base
    pub msc_base: u32,
}

impl DeviceProfile {
    /// Main flash size in bytes
    pub fn flash_size(&self) -> u32 {
        u32::from(self.flash_kib) * 1024
    }

    /// Number of main flash pages
    pub fn main_pages(&self) -> u32 {
        self.flash_size() / self.page_size
    }

    /// Part family number (22, 23, ...)
    pub fn part_family_num(&self) -> u8 {
        self.part.family_num
    }

    /// Short part name, e.g. `MG22C224, rev 1`
    pub fn part_name(&self) -> heapless::String<32> {
        use core::fmt::Write;

        let mut name = heapless::String::new();
        // 32 bytes always fits the longest possible rendering
        let _ = write!(name, "{}", self);
        name
    }
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}G{}{}{:03}, rev {}",
            self.part.family.letter(),
            self.part.family_num,
            self.part.dev_num_letter,
            self.part.dev_num_digits,
            self.prod_rev
        )
    }
}

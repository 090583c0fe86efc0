//! In-memory mirror of the lock words

use alloc::vec;

use super::word;
use crate::bank::BankKind;
use crate::device::regions::{LOCKWORDS_SIZE, LOCK_BITS, LOCK_BITS_EXTRA};
use crate::error::{Error, Result};
use crate::msc::{self, Msc};
use crate::target::Target;

/// Number of 32-bit lock words
pub const LOCKWORDS: usize = LOCKWORDS_SIZE as usize / 4;

/// Page-lock words available before the metadata words
const PAGE_LOCK_WORDS: usize = word::CLW0;

/// Mirror of the lock words area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockBitmap {
    words: [u32; LOCKWORDS],
}

impl Default for LockBitmap {
    fn default() -> Self {
        Self::new()
    }
}

impl LockBitmap {
    /// A mirror with everything unlocked, matching an erased page
    pub const fn new() -> Self {
        Self {
            words: [u32::MAX; LOCKWORDS],
        }
    }

    /// Raw lock word
    pub fn word(&self, index: usize) -> u32 {
        self.words[index]
    }

    /// Whether `page` of a bank of `kind` is write protected
    pub fn page_locked(&self, kind: BankKind, page: u32) -> bool {
        let (dw, mask) = match kind {
            BankKind::Main => match Self::page_slot(page) {
                Some((index, mask)) => (self.words[index], mask),
                None => return false,
            },
            BankKind::UserData => (self.words[word::ULW], word::ULW_USER_DATA),
            BankKind::LockBits => (self.words[word::ULW], word::ULW_LOCK_BITS),
        };
        dw & mask == 0
    }

    /// Change the protection of a main flash page in the mirror
    ///
    /// Nothing is written to the device until [`LockBitmap::commit`].
    pub fn set_page_lock(&mut self, kind: BankKind, page: u32, locked: bool) -> Result<()> {
        if kind != BankKind::Main {
            log::error!("Locking user and lockbits pages is not supported");
            return Err(Error::ProtectUnsupported);
        }

        let (index, mask) = Self::page_slot(page).ok_or(Error::SectorOutOfRange)?;
        if locked {
            self.words[index] &= !mask;
        } else {
            self.words[index] |= mask;
        }
        Ok(())
    }

    fn page_slot(page: u32) -> Option<(usize, u32)> {
        let index = (page >> 5) as usize;
        (index < PAGE_LOCK_WORDS).then(|| (index, 1 << (page & 0x1F)))
    }

    /// Whether the debug interface is locked
    pub fn debug_locked(&self) -> bool {
        self.words[word::DLW] & 0x1 == 0
    }

    /// Lock the debug interface in the mirror
    pub fn lock_debug(&mut self) {
        self.words[word::DLW] = 0;
    }

    /// Little-endian image of the lock words area
    pub fn to_bytes(&self) -> [u8; LOCKWORDS_SIZE as usize] {
        let mut bytes = [0u8; LOCKWORDS_SIZE as usize];
        for (chunk, w) in bytes.chunks_exact_mut(4).zip(self.words.iter()) {
            chunk.copy_from_slice(&w.to_le_bytes());
        }
        bytes
    }

    /// Read the page-lock words for `main_pages` pages plus the metadata words
    ///
    /// Words not read keep their unlocked value. A failed read returns the
    /// error and no bitmap.
    pub fn load<T: Target + ?Sized>(target: &mut T, main_pages: u32) -> Result<Self> {
        let mut bitmap = Self::new();
        let page_words = (main_pages as usize).div_ceil(32).min(PAGE_LOCK_WORDS);

        for i in 0..page_words {
            bitmap.words[i] = target.read_u32(Self::word_addr(i)).map_err(|e| {
                log::error!("Failed to read PLW {}", i);
                e
            })?;
        }

        for index in word::METADATA {
            bitmap.words[index] = target.read_u32(Self::word_addr(index)).map_err(|e| {
                log::error!("Failed to read lock word {}", index);
                e
            })?;
        }

        Ok(bitmap)
    }

    fn word_addr(index: usize) -> u32 {
        LOCK_BITS + (index as u32) * 4
    }

    /// Program the mirror into the lock words area
    ///
    /// The area must be erased.
    pub fn write_words<T: Target + ?Sized>(&self, msc: &Msc, target: &mut T) -> Result<()> {
        msc::program(msc, target, LOCK_BITS, &self.to_bytes())
    }

    /// Rewrite the lock bits page from the mirror
    ///
    /// Data stored after the lock words is read back first and restored
    /// after the erase. A failure leaves the page contents indeterminate;
    /// reload before trusting the mirror again.
    pub fn commit<T: Target + ?Sized>(
        &self,
        msc: &Msc,
        target: &mut T,
        page_size: u32,
    ) -> Result<()> {
        if !target.is_halted() {
            log::error!("Target not halted");
            return Err(Error::TargetNotHalted);
        }

        let extra_len = page_size.saturating_sub(LOCKWORDS_SIZE) as usize;
        let mut extra = vec![0u8; extra_len];
        if extra_len > 0 {
            target.read_bytes(LOCK_BITS_EXTRA, &mut extra).map_err(|e| {
                log::error!("Failed to read extra contents of LB page");
                e
            })?;
        }

        msc.with_write_enabled(target, |msc, target| {
            msc::erase_page(msc, target, LOCK_BITS)
        })
        .map_err(|e| {
            log::error!("Failed to erase LB page");
            e
        })?;

        if extra_len > 0 {
            msc::program(msc, target, LOCK_BITS_EXTRA, &extra).map_err(|e| {
                log::error!("Failed to restore extra contents of LB page");
                e
            })?;
        }

        self.write_words(msc, target)
    }
}

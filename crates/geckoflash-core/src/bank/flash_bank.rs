//! Flash bank operations

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;

use super::kind::BankKind;
use super::session::SharedSession;
use crate::device::regions::{cmu, AUX_PAGE_SIZE, FLASH_BASE, FLASH_BASE_G23, LOCKWORDS_SIZE};
use crate::device::{read_device_info, DeviceProfile};
use crate::error::{Error, Result};
use crate::lockbits::LockBitmap;
use crate::msc::{self, Msc};
use crate::target::Target;

/// One erasable page of a bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sector {
    /// Offset from the bank base
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
    /// Erased state, `None` until checked
    pub erased: Option<bool>,
    /// Write protection, `None` until known
    pub protected: Option<bool>,
}

/// A flash bank of an attached target
///
/// Created by [`SessionRegistry::attach`](super::SessionRegistry::attach).
/// All operations except [`FlashBank::probe`] and [`FlashBank::auto_probe`]
/// require a successful probe first.
#[derive(Debug)]
pub struct FlashBank {
    kind: BankKind,
    base: u32,
    size: u32,
    sectors: Vec<Sector>,
    session: SharedSession,
}

impl FlashBank {
    pub(crate) fn new(kind: BankKind, base: u32, session: SharedSession) -> Self {
        Self {
            kind,
            base,
            size: 0,
            sectors: Vec::new(),
            session,
        }
    }

    /// Region this bank covers
    pub fn kind(&self) -> BankKind {
        self.kind
    }

    /// Base address
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Size in bytes, 0 until probed
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Sector table, empty until probed
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Shared controller session
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Number of banks sharing the session
    pub fn session_refs(&self) -> usize {
        Rc::strong_count(&self.session)
    }

    /// Whether this bank has been probed
    pub fn is_probed(&self) -> bool {
        self.session.borrow().is_probed(self.kind)
    }

    /// Device profile from the last probe
    pub fn profile(&self) -> Option<DeviceProfile> {
        self.session.borrow().profile
    }

    /// Copy of the lock bits mirror
    pub fn lock_bits(&self) -> LockBitmap {
        self.session.borrow().lock_bits.clone()
    }

    /// Identify the device and build the sector table
    ///
    /// The lock bits mirror is reloaded for the whole main array on every
    /// probe. On failure the bank is left unprobed with its previous sector
    /// table discarded; the shared session keeps its mirror so other banks
    /// never commit a stale one.
    pub fn probe<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<()> {
        let idx = self.kind.index();
        self.session.borrow_mut().probed[idx] = false;
        self.sectors.clear();
        self.size = 0;

        let profile = read_device_info(target)?;
        let msc = Msc::new(profile.msc_base, *self.session.borrow().msc.options());

        let main_base = if profile.part_family_num() == 23 {
            FLASH_BASE_G23
        } else {
            FLASH_BASE
        };
        if self.kind == BankKind::Main {
            self.base = main_base;
        }

        enable_msc_clock(target, &profile)?;

        let lock_bits = LockBitmap::load(target, profile.main_pages()).map_err(|e| {
            log::error!("Failed to read LB data");
            e
        })?;

        let (count, page_size) = match self.kind {
            BankKind::Main => (profile.main_pages(), profile.page_size),
            BankKind::UserData | BankKind::LockBits => (1, AUX_PAGE_SIZE),
        };

        let sectors = (0..count)
            .map(|i| Sector {
                offset: i * page_size,
                size: page_size,
                erased: None,
                protected: Some(lock_bits.page_locked(self.kind, i)),
            })
            .collect();

        log::info!("detected part: {}", profile);
        log::info!("{} size = {} bytes", self.kind, count * page_size);
        log::info!("flash page size = {} bytes", page_size);

        self.sectors = sectors;
        self.size = count * page_size;

        let mut session = self.session.borrow_mut();
        session.profile = Some(profile);
        session.msc = msc;
        session.lock_bits = lock_bits;
        session.probed[idx] = true;

        Ok(())
    }

    /// Probe unless already probed
    pub fn auto_probe<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<()> {
        if self.is_probed() && !self.sectors.is_empty() {
            return Ok(());
        }
        self.probe(target)
    }

    fn probed_context(&self) -> Result<(Msc, DeviceProfile)> {
        let session = self.session.borrow();
        match session.profile {
            Some(profile) if session.is_probed(self.kind) => Ok((session.msc, profile)),
            _ => Err(Error::BankNotProbed),
        }
    }

    fn check_range(&self, first: u32, last: u32) -> Result<()> {
        if first > last || last as usize >= self.sectors.len() {
            return Err(Error::SectorOutOfRange);
        }
        Ok(())
    }

    fn check_bounds(&self, offset: u32, len: usize) -> Result<()> {
        let end = u64::from(offset) + len as u64;
        if end > u64::from(self.size) {
            return Err(Error::AddressOutOfBounds);
        }
        Ok(())
    }

    /// Erase sectors `first..=last`
    ///
    /// Every sector in the range is attempted; the first failure is
    /// returned. Erasing the lock bits page writes the lock words mirror
    /// back afterwards.
    pub fn erase<T: Target + ?Sized>(&mut self, target: &mut T, first: u32, last: u32) -> Result<()> {
        let (msc, _) = self.probed_context()?;

        if !target.is_halted() {
            log::error!("Target not halted");
            return Err(Error::TargetNotHalted);
        }
        self.check_range(first, last)?;

        let base = self.base;
        let addrs: Vec<u32> = self.sectors[first as usize..=last as usize]
            .iter()
            .map(|s| base + s.offset)
            .collect();

        let mut result = msc.with_write_enabled(target, |msc, target| {
            msc::erase_pages(msc, target, addrs.iter().copied())
        });

        if result.is_ok() && self.kind != BankKind::LockBits {
            for sector in &mut self.sectors[first as usize..=last as usize] {
                sector.erased = Some(true);
            }
        }

        if self.kind == BankKind::LockBits {
            let lock_bits = self.lock_bits();
            if let Err(e) = lock_bits.write_words(&msc, target) {
                log::error!("Failed to restore lockbits after erase");
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }

        result
    }

    /// Write `data` at `offset` from the bank base
    ///
    /// The lock words at the start of the lock bits page can only be changed
    /// through [`FlashBank::protect`] and [`FlashBank::debug_lock`].
    pub fn write<T: Target + ?Sized>(&mut self, target: &mut T, offset: u32, data: &[u8]) -> Result<()> {
        let (msc, _) = self.probed_context()?;

        if self.kind == BankKind::LockBits && offset < LOCKWORDS_SIZE {
            log::error!("Cannot write to lock words");
            return Err(Error::LockWordsReadOnly);
        }
        self.check_bounds(offset, data.len())?;

        let result = msc::program(&msc, target, self.base + offset, data);

        // Rejected before touching flash: contents unchanged
        if matches!(
            result,
            Err(Error::TargetNotHalted | Error::AlignmentViolation { .. })
        ) {
            return result;
        }

        let start = offset / self.page_size().max(1);
        let end = (offset + data.len() as u32).div_ceil(self.page_size().max(1));
        for sector in self.sectors.iter_mut().take(end as usize).skip(start as usize) {
            sector.erased = None;
        }
        result
    }

    fn page_size(&self) -> u32 {
        self.sectors.first().map(|s| s.size).unwrap_or(0)
    }

    /// Read `buf.len()` bytes at `offset` from the bank base
    pub fn read<T: Target + ?Sized>(&self, target: &mut T, offset: u32, buf: &mut [u8]) -> Result<()> {
        self.probed_context()?;
        self.check_bounds(offset, buf.len())?;
        target.read_bytes(self.base + offset, buf)
    }

    /// Set or clear write protection of sectors `first..=last`
    ///
    /// Only main flash pages can be protected. The lock bits page is
    /// rewritten immediately.
    pub fn protect<T: Target + ?Sized>(
        &mut self,
        target: &mut T,
        set: bool,
        first: u32,
        last: u32,
    ) -> Result<()> {
        let (msc, profile) = self.probed_context()?;

        if !target.is_halted() {
            log::error!("Target not halted");
            return Err(Error::TargetNotHalted);
        }
        self.check_range(first, last)?;

        let lock_bits = {
            let mut session = self.session.borrow_mut();
            for page in first..=last {
                session
                    .lock_bits
                    .set_page_lock(self.kind, page, set)
                    .map_err(|e| {
                        log::error!("Failed to set lock on page {}", page);
                        e
                    })?;
            }
            session.lock_bits.clone()
        };

        lock_bits.commit(&msc, target, profile.page_size).map_err(|e| {
            log::error!("Failed to write LB page");
            e
        })?;

        self.refresh_protection(&lock_bits);
        Ok(())
    }

    /// Reload the lock bits and refresh the protection state of every sector
    pub fn protect_check<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<()> {
        let (_, profile) = self.probed_context()?;

        if !target.is_halted() {
            log::error!("Target not halted");
            return Err(Error::TargetNotHalted);
        }

        let lock_bits = LockBitmap::load(target, profile.main_pages()).map_err(|e| {
            log::error!("Failed to read LB data");
            e
        })?;

        self.refresh_protection(&lock_bits);
        self.session.borrow_mut().lock_bits = lock_bits;
        Ok(())
    }

    fn refresh_protection(&mut self, lock_bits: &LockBitmap) {
        let kind = self.kind;
        for (i, sector) in self.sectors.iter_mut().enumerate() {
            sector.protected = Some(lock_bits.page_locked(kind, i as u32));
        }
    }

    /// Re-read the device info and describe the part, e.g. `MG22C224, rev 1`
    pub fn info<T: Target + ?Sized>(&self, target: &mut T) -> Result<heapless::String<32>> {
        let profile = read_device_info(target).map_err(|e| {
            log::error!("Failed to read EFM32 info");
            e
        })?;
        Ok(profile.part_name())
    }

    /// Lock the debug interface
    ///
    /// Takes effect after the next device reset.
    pub fn debug_lock<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<()> {
        let (msc, profile) = self.probed_context()?;

        if !target.is_halted() {
            log::error!("Target not halted");
            return Err(Error::TargetNotHalted);
        }

        let lock_bits = {
            let mut session = self.session.borrow_mut();
            session.lock_bits.lock_debug();
            session.lock_bits.clone()
        };

        lock_bits.commit(&msc, target, profile.page_size).map_err(|e| {
            log::error!("Failed to write LB page");
            e
        })?;

        log::info!("debug interface locked, reset the device to apply");
        Ok(())
    }

    /// Check every sector for the erased (all 0xFF) state
    pub fn erase_check<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<()> {
        self.probed_context()?;

        let base = self.base;
        let mut buf = vec![0u8; self.page_size() as usize];
        for sector in &mut self.sectors {
            target.read_bytes(base + sector.offset, &mut buf)?;
            sector.erased = Some(buf.iter().all(|&b| b == 0xFF));
        }
        Ok(())
    }
}

fn enable_msc_clock<T: Target + ?Sized>(target: &mut T, profile: &DeviceProfile) -> Result<()> {
    let mask = match profile.part_family_num() {
        22 => cmu::CLKEN1_MSC_G22,
        23 => cmu::CLKEN1_MSC_G23,
        other => {
            log::warn!(
                "Unknown part family number {}, using xG22 MSC clock enable",
                other
            );
            cmu::CLKEN1_MSC_G22
        }
    };

    target.write_u32(cmu::CLKEN1_SET, mask).map_err(|e| {
        log::error!("Failed to enable MSC clock");
        e
    })
}

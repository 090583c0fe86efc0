//! MSC register protocol
//!
//! Register primitives and the bounded status poll that every erase and
//! write sequence is built on.

use super::regs::{self, MscStatus};
use crate::config::FlashOptions;
use crate::error::{Error, Result};
use crate::target::Target;

/// Handle to one MSC register block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Msc {
    base: u32,
    lock_reg: u32,
    options: FlashOptions,
}

impl Msc {
    /// Create a handle for the MSC at `base`
    pub const fn new(base: u32, options: FlashOptions) -> Self {
        Self {
            base,
            lock_reg: regs::LOCK,
            options,
        }
    }

    /// Register block base address
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Operation tunables
    pub const fn options(&self) -> &FlashOptions {
        &self.options
    }

    /// Read a register
    pub fn read_reg<T: Target + ?Sized>(&self, target: &mut T, offset: u32) -> Result<u32> {
        target.read_u32(self.base + offset)
    }

    /// Write a register
    pub fn write_reg<T: Target + ?Sized>(
        &self,
        target: &mut T,
        offset: u32,
        value: u32,
    ) -> Result<()> {
        target.write_u32(self.base + offset, value)
    }

    /// Read-modify-write: OR `mask` in when `set`, clear it otherwise
    pub fn set_reg_bits<T: Target + ?Sized>(
        &self,
        target: &mut T,
        offset: u32,
        mask: u32,
        set: bool,
    ) -> Result<()> {
        let value = self.read_reg(target, offset)?;
        let value = if set { value | mask } else { value & !mask };
        self.write_reg(target, offset, value)
    }

    /// Assert or deassert write enable
    pub fn set_wren<T: Target + ?Sized>(&self, target: &mut T, enable: bool) -> Result<()> {
        self.set_reg_bits(target, regs::WRITECTRL, regs::WRITECTRL_WREN, enable)
    }

    /// Lock or unlock the MSC configuration registers
    pub fn lock<T: Target + ?Sized>(&self, target: &mut T, lock: bool) -> Result<()> {
        let key = if lock { 0 } else { regs::LOCK_KEY };
        self.write_reg(target, self.lock_reg, key)
    }

    /// Read the status register
    pub fn status<T: Target + ?Sized>(&self, target: &mut T) -> Result<MscStatus> {
        let raw = self.read_reg(target, regs::STATUS)?;
        log::debug!("status: 0x{:08X}", raw);
        Ok(MscStatus::from_bits_retain(raw))
    }

    /// Poll STATUS until `mask` is set (`want_set`) or clear
    ///
    /// Every unsatisfied read costs one tick of `timeout` and yields to the
    /// target's liveness hook, so a budget of `n` allows `n + 1` reads.
    pub fn wait_status<T: Target + ?Sized>(
        &self,
        target: &mut T,
        timeout: u32,
        mask: MscStatus,
        want_set: bool,
    ) -> Result<()> {
        let mut remaining = timeout;

        let (status, result) = loop {
            let status = self.status(target)?;
            if status.intersects(mask) == want_set {
                break (status, Ok(()));
            }
            if remaining == 0 {
                log::error!("timed out waiting for MSC status");
                break (status, Err(Error::Timeout));
            }
            remaining -= 1;
            target.alive_sleep(1);
        };

        if status.contains(MscStatus::ERASEABORTED) {
            log::warn!("page erase was aborted");
        }

        result
    }

    /// Latch `addr` as the current flash address and check it is usable
    ///
    /// The caller must have asserted write enable.
    pub fn latch_address<T: Target + ?Sized>(&self, target: &mut T, addr: u32) -> Result<()> {
        self.write_reg(target, regs::ADDRB, addr)?;
        self.set_reg_bits(target, regs::WRITECMD, regs::WRITECMD_LADDRIM, true)?;

        let status = self.status(target)?;
        if status.contains(MscStatus::LOCKED) {
            log::error!("Page at 0x{:08X} is locked", addr);
            return Err(Error::PageLocked { addr });
        }
        if status.contains(MscStatus::INVADDR) {
            log::error!("Invalid address 0x{:08X}", addr);
            return Err(Error::AddressInvalid { addr });
        }
        Ok(())
    }

    /// Run `f` with the MSC unlocked and write enable asserted
    ///
    /// Write enable is dropped and the MSC re-locked on every path. An
    /// error from `f` takes precedence over one from the teardown.
    pub fn with_write_enabled<T, R, F>(&self, target: &mut T, f: F) -> Result<R>
    where
        T: Target + ?Sized,
        F: FnOnce(&Self, &mut T) -> Result<R>,
    {
        // A failed unlock shows up as a failed WREN or LOCKED status below
        if let Err(e) = self.lock(target, false) {
            log::warn!("Failed to unlock MSC: {}", e);
        }

        if let Err(e) = self.set_wren(target, true) {
            log::error!("Failed to enable MSC write");
            let _ = self.lock(target, true);
            return Err(e);
        }

        let result = f(self, target);

        let teardown = self.set_wren(target, false);
        if let Err(e) = self.lock(target, true) {
            log::warn!("Failed to lock MSC: {}", e);
        }

        match (result, teardown) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
            (Ok(value), Ok(())) => Ok(value),
        }
    }
}

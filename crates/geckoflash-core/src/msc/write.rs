//! Flash write engine
//!
//! Two programmers share one interface: [`BlockWriter`] uploads a routine to
//! target RAM and streams data to it, [`WordWriter`] pokes every word through
//! the MSC registers from the host. [`write_words`] tries the block writer
//! and falls back to the word writer when the target has no room for it.

use alloc::borrow::Cow;
use alloc::vec;

use super::loader::WRITE_ALGORITHM;
use super::protocol::Msc;
use super::regs::{self, MscStatus};
use crate::error::{Error, Result};
use crate::target::{AlgorithmRun, RegParam, Target, WorkArea};

/// A strategy for programming whole words into flash
///
/// Implementations expect the MSC to be unlocked with write enable asserted,
/// a 4-byte aligned `addr` and a `data` length that is a multiple of 4.
pub trait WordProgrammer {
    /// Short name for log messages
    fn name(&self) -> &'static str;

    /// Program `data` starting at `addr`
    fn program<T: Target + ?Sized>(
        &self,
        msc: &Msc,
        target: &mut T,
        addr: u32,
        data: &[u8],
    ) -> Result<()>;
}

/// Programs through the on-target write routine
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockWriter;

impl BlockWriter {
    fn alloc_buffer<T: Target + ?Sized>(msc: &Msc, target: &mut T) -> Result<WorkArea> {
        let floor = msc.options().block_buffer_floor;
        let mut size = msc.options().block_buffer_size;

        loop {
            match target.alloc_work_area(size) {
                Ok(area) => return Ok(area),
                Err(_) => {
                    size /= 2;
                    size &= !3;
                    if size <= floor {
                        return Err(Error::ResourceExhausted);
                    }
                }
            }
        }
    }

    fn run<T: Target + ?Sized>(
        msc: &Msc,
        target: &mut T,
        code: WorkArea,
        buffer: WorkArea,
        addr: u32,
        data: &[u8],
    ) -> Result<()> {
        let mut params = [
            RegParam::in_out("r0", msc.base()),
            RegParam::out("r1", (data.len() / 4) as u32),
            RegParam::out("r2", buffer.address),
            RegParam::out("r3", buffer.end()),
            RegParam::in_out("r4", addr),
        ];

        let mut run = AlgorithmRun {
            entry: code.address,
            fifo: buffer,
            data,
            block_size: 4,
            params: &mut params,
        };

        match target.run_flash_algorithm(&mut run) {
            Err(Error::AlgorithmFailed) => {
                let status = MscStatus::from_bits_retain(run.param("r0").unwrap_or(0));
                let fault = run.param("r4").unwrap_or(addr);
                log::error!("flash write failed at address 0x{:08X}", fault);

                if status.contains(MscStatus::LOCKED) {
                    log::error!("flash memory write protected");
                    Err(Error::PageLocked { addr: fault })
                } else if status.contains(MscStatus::INVADDR) {
                    log::error!("invalid flash memory write address");
                    Err(Error::AddressInvalid { addr: fault })
                } else {
                    Err(Error::OperationFailed { addr: fault })
                }
            }
            other => other,
        }
    }
}

impl WordProgrammer for BlockWriter {
    fn name(&self) -> &'static str {
        "block"
    }

    fn program<T: Target + ?Sized>(
        &self,
        msc: &Msc,
        target: &mut T,
        addr: u32,
        data: &[u8],
    ) -> Result<()> {
        let code = match target.alloc_work_area(WRITE_ALGORITHM.len() as u32) {
            Ok(area) => area,
            Err(_) => {
                log::warn!("no working area available, can't do block memory writes");
                return Err(Error::ResourceExhausted);
            }
        };

        if let Err(e) = target.write_bytes(code.address, &WRITE_ALGORITHM) {
            target.free_work_area(code);
            return Err(e);
        }

        let buffer = match Self::alloc_buffer(msc, target) {
            Ok(area) => area,
            Err(e) => {
                target.free_work_area(code);
                log::warn!("no large enough working area available, can't do block memory writes");
                return Err(e);
            }
        };
        log::debug!(
            "block write: routine at 0x{:08X}, {} byte buffer at 0x{:08X}",
            code.address,
            buffer.size,
            buffer.address
        );

        let result = Self::run(msc, target, code, buffer, addr, data);

        target.free_work_area(buffer);
        target.free_work_area(code);

        result
    }
}

/// Programs one word at a time through the MSC registers
#[derive(Debug, Clone, Copy, Default)]
pub struct WordWriter;

impl WordWriter {
    /// Program a single word
    pub fn write_word<T: Target + ?Sized>(
        msc: &Msc,
        target: &mut T,
        addr: u32,
        value: u32,
    ) -> Result<()> {
        let options = *msc.options();

        // Long writes would otherwise starve the debug connection
        target.keep_alive();

        msc.latch_address(target, addr)?;

        msc.wait_status(target, options.wdataready_timeout, MscStatus::WDATAREADY, true)
            .map_err(|e| {
                log::error!("Wait for WDATAREADY failed");
                e
            })?;

        msc.write_reg(target, regs::WDATA, value).map_err(|e| {
            log::error!("WDATA write failed");
            e
        })?;

        msc.write_reg(target, regs::WRITECMD, regs::WRITECMD_WRITEONCE)
            .map_err(|e| {
                log::error!("WRITECMD write failed");
                e
            })?;

        msc.wait_status(target, options.write_timeout, MscStatus::BUSY, false)
            .map_err(|e| {
                log::error!("Wait for BUSY failed");
                e
            })
    }
}

impl WordProgrammer for WordWriter {
    fn name(&self) -> &'static str {
        "word"
    }

    fn program<T: Target + ?Sized>(
        &self,
        msc: &Msc,
        target: &mut T,
        addr: u32,
        data: &[u8],
    ) -> Result<()> {
        for (i, chunk) in data.chunks_exact(4).enumerate() {
            let value = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            Self::write_word(msc, target, addr + (i as u32) * 4, value)?;
        }
        Ok(())
    }
}

/// Program words, preferring the block writer
///
/// Only [`Error::ResourceExhausted`] from the block writer triggers the
/// fallback; every other error is returned as is.
pub fn write_words<T: Target + ?Sized>(
    msc: &Msc,
    target: &mut T,
    addr: u32,
    data: &[u8],
) -> Result<()> {
    debug_assert_eq!(data.len() % 4, 0);

    match BlockWriter.program(msc, target, addr, data) {
        Err(Error::ResourceExhausted) => {
            log::warn!("couldn't use block writes, falling back to single memory accesses");
            WordWriter.program(msc, target, addr, data)
        }
        other => other,
    }
}

/// Extend `data` to a whole number of words, padding with 0xFF
pub fn pad_to_words(data: &[u8]) -> Cow<'_, [u8]> {
    if data.len() % 4 == 0 {
        return Cow::Borrowed(data);
    }

    let padded_len = (data.len() | 3) + 1;
    log::info!(
        "odd number of bytes to write ({}), extending to {} and padding with 0xff",
        data.len(),
        padded_len
    );
    let mut padded = vec![0xFF; padded_len];
    padded[..data.len()].copy_from_slice(data);
    Cow::Owned(padded)
}

/// Write `data` to flash at `addr` as one unlock / write-enable transaction
///
/// The destination must be 4-byte aligned; the length is padded up to a
/// whole word with 0xFF. The target must be halted.
pub fn program<T: Target + ?Sized>(
    msc: &Msc,
    target: &mut T,
    addr: u32,
    data: &[u8],
) -> Result<()> {
    if !target.is_halted() {
        log::error!("Target not halted");
        return Err(Error::TargetNotHalted);
    }

    if addr & 0x3 != 0 {
        log::error!("addr 0x{:08X} breaks required 4-byte alignment", addr);
        return Err(Error::AlignmentViolation { addr });
    }

    let data = pad_to_words(data);
    msc.with_write_enabled(target, |msc, target| write_words(msc, target, addr, &data))
}

//! geckoflash-dummy - Simulated EFM32/EFR32 Series 2 target
//!
//! This crate provides an in-memory target that behaves like a Series 2
//! chip behind a debug probe: a device information page, main flash, the
//! user data and lock bits pages, scratch RAM and an MSC register block
//! with lock, write enable, address latching and status reporting. Flash
//! writes can only clear bits and erases set whole pages to 0xFF, like the
//! real array. It is used by the tests and by the command line tool.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use geckoflash_core::device::regions::{self, cmu, di};
use geckoflash_core::error::{Error, Result};
use geckoflash_core::lockbits::word;
use geckoflash_core::msc::loader::WRITE_ALGORITHM;
use geckoflash_core::msc::regs::{self, MscStatus};
use geckoflash_core::target::{AlgorithmRun, CoreType, Target, TargetId, WorkArea};

#[cfg(test)]
mod tests;

/// Start of the simulated scratch RAM
pub const RAM_BASE: u32 = 0x2000_0000;

const DEV_INFO_SIZE: u32 = 0x200;
const MSC_BLOCK_SIZE: u32 = 0x100;
const CMU_BLOCK_SIZE: u32 = 0x2000;

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// Identity and geometry of the simulated chip
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct DummyConfig {
    /// CPUID part number of the core
    pub cpu_partno: u16,
    /// Legacy family id in the device info page
    pub legacy_family: u8,
    /// 6-bit part family code (0 = F, 1 = M, 2 = B, 5 = P)
    pub part_family_code: u8,
    /// Part family number (22 for xG22)
    pub part_family_num: u8,
    /// Device serial, decoded to letter and digits
    pub device_serial: u16,
    /// Silicon revision
    pub prod_rev: u8,
    /// Main flash size in KiB
    pub flash_kib: u16,
    /// RAM size in KiB as reported by the device info page
    pub ram_kib: u16,
    /// Page size exponent byte (page size = 1 << (exp + 10))
    pub page_size_exponent: u8,
    /// Address of the simulated MSC register block
    pub msc_base: u32,
    /// Bytes of scratch RAM available for work areas
    pub work_area_size: u32,
    /// Whether uploaded flash routines can be run
    pub algorithm_support: bool,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            cpu_partno: CoreType::PARTNO_M33,
            legacy_family: 128,
            part_family_code: 1,
            part_family_num: 22,
            device_serial: 2224,
            prod_rev: 1,
            flash_kib: 512,
            ram_kib: 32,
            page_size_exponent: 3,
            msc_base: regs::MSC_BASE,
            work_area_size: 0x8000,
            algorithm_support: true,
        }
    }
}

impl DummyConfig {
    /// Extended part info word
    pub fn part_word(&self) -> u32 {
        (u32::from(self.part_family_code & 0x3F) << 24)
            | (u32::from(self.part_family_num) << 16)
            | u32::from(self.device_serial)
    }

    /// Simulated page size
    ///
    /// Unsupported exponents fall back to 2 KiB pages for storage; the
    /// driver rejects them at probe time.
    pub fn page_size(&self) -> u32 {
        match self.page_size_exponent {
            1..=3 => 1 << (u32::from(self.page_size_exponent) + 10),
            _ => 2048,
        }
    }

    /// Main flash base address
    pub fn main_base(&self) -> u32 {
        if self.part_family_num == 23 {
            regions::FLASH_BASE_G23
        } else {
            regions::FLASH_BASE
        }
    }

    /// CLKEN1 bit gating the MSC
    pub fn msc_clock_mask(&self) -> u32 {
        if self.part_family_num == 23 {
            cmu::CLKEN1_MSC_G23
        } else {
            cmu::CLKEN1_MSC_G22
        }
    }
}

/// Operation counters of the simulated target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Host reads of MSC STATUS
    pub status_reads: u32,
    /// Host writes to any MSC register
    pub register_writes: u32,
    /// Liveness ticks spent in `alive_sleep`
    pub sleeps: u32,
    /// `keep_alive` calls
    pub keep_alives: u32,
    /// Page erases performed
    pub erases: u32,
    /// Words programmed
    pub word_writes: u32,
    /// Flash routine runs
    pub algorithm_runs: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Main,
    UserData,
    LockBits,
    DevInfo,
    Ram,
    Msc,
    Cmu,
}

#[derive(Debug, Default)]
struct MscState {
    unlocked: bool,
    writectrl: u32,
    addrb: u32,
    wdata: u32,
    latched: Option<u32>,
    error: u32,
    busy_remaining: u32,
}

/// Simulated Series 2 target
pub struct DummyTarget {
    config: DummyConfig,
    id: TargetId,
    halted: bool,
    main: Vec<u8>,
    user_data: Vec<u8>,
    lock_bits: Vec<u8>,
    dev_info: Vec<u8>,
    ram: Vec<u8>,
    areas: Vec<WorkArea>,
    msc: MscState,
    clken1: u32,
    forced_status: u32,
    masked_status: u32,
    busy_cycles: u32,
    counters: Counters,
}

impl DummyTarget {
    /// Create a halted target with erased flash
    pub fn new(config: DummyConfig) -> Self {
        let page_size = config.page_size() as usize;
        let mut dev_info = vec![0u8; DEV_INFO_SIZE as usize];
        let mut put = |addr: u32, bytes: &[u8]| {
            let off = (addr - regions::DEV_INFO) as usize;
            dev_info[off..off + bytes.len()].copy_from_slice(bytes);
        };
        put(di::PROD_REV, &[config.prod_rev]);
        put(di::PART, &config.part_word().to_le_bytes());
        put(di::PAGE_SIZE, &[config.page_size_exponent]);
        put(di::FLASH_SIZE, &config.flash_kib.to_le_bytes());
        put(di::RAM_SIZE, &config.ram_kib.to_le_bytes());
        put(di::LEGACY_FAMILY, &[config.legacy_family]);

        Self {
            id: TargetId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            halted: true,
            main: vec![0xFF; usize::from(config.flash_kib) * 1024],
            user_data: vec![0xFF; page_size],
            lock_bits: vec![0xFF; page_size],
            dev_info,
            ram: vec![0; config.work_area_size as usize],
            areas: Vec::new(),
            msc: MscState::default(),
            clken1: 0,
            forced_status: 0,
            masked_status: 0,
            busy_cycles: 0,
            counters: Counters::default(),
            config,
        }
    }

    /// Create a target with the default xG22 configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Halt or resume the simulated CPU
    pub fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }

    /// Report a different CPUID part number from now on
    pub fn set_cpu_partno(&mut self, partno: u16) {
        self.config.cpu_partno = partno;
    }

    /// Main flash contents
    pub fn main_flash(&self) -> &[u8] {
        &self.main
    }

    /// Mutable main flash contents, bypassing the MSC
    pub fn main_flash_mut(&mut self) -> &mut [u8] {
        &mut self.main
    }

    /// User data page contents
    pub fn user_data(&self) -> &[u8] {
        &self.user_data
    }

    /// Mutable user data page contents, bypassing the MSC
    pub fn user_data_mut(&mut self) -> &mut [u8] {
        &mut self.user_data
    }

    /// Lock bits page contents
    pub fn lock_bits_page(&self) -> &[u8] {
        &self.lock_bits
    }

    /// Mutable lock bits page contents, bypassing the MSC
    pub fn lock_bits_page_mut(&mut self) -> &mut [u8] {
        &mut self.lock_bits
    }

    /// Lock word `index` as stored in the lock bits page
    pub fn lock_word(&self, index: usize) -> u32 {
        let off = index * 4;
        u32::from_le_bytes([
            self.lock_bits[off],
            self.lock_bits[off + 1],
            self.lock_bits[off + 2],
            self.lock_bits[off + 3],
        ])
    }

    /// Bits always reported set in STATUS
    pub fn force_status(&mut self, bits: MscStatus) {
        self.forced_status = bits.bits();
    }

    /// Bits never reported in STATUS
    pub fn mask_status(&mut self, bits: MscStatus) {
        self.masked_status = bits.bits();
    }

    /// Keep BUSY set for `reads` STATUS reads after every erase or write
    pub fn set_busy_cycles(&mut self, reads: u32) {
        self.busy_cycles = reads;
    }

    /// Operation counters
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Reset the operation counters
    pub fn reset_counters(&mut self) {
        self.counters = Counters::default();
    }

    /// Number of allocated work areas
    pub fn live_work_areas(&self) -> usize {
        self.areas.len()
    }

    /// Whether the MSC clock has been enabled
    pub fn msc_clock_enabled(&self) -> bool {
        self.clken1 & self.config.msc_clock_mask() != 0
    }

    /// Whether the MSC configuration registers are unlocked
    pub fn msc_unlocked(&self) -> bool {
        self.msc.unlocked
    }

    /// Whether write enable is asserted
    pub fn write_enabled(&self) -> bool {
        self.msc.writectrl & regs::WRITECTRL_WREN != 0
    }

    fn locate(&self, addr: u32, len: usize) -> Result<(Region, usize)> {
        let len = len as u64;
        let map = [
            (Region::Main, self.config.main_base(), self.main.len() as u32),
            (Region::UserData, regions::USER_DATA, self.user_data.len() as u32),
            (Region::LockBits, regions::LOCK_BITS, self.lock_bits.len() as u32),
            (Region::DevInfo, regions::DEV_INFO, DEV_INFO_SIZE),
            (Region::Ram, RAM_BASE, self.ram.len() as u32),
            (Region::Msc, self.config.msc_base, MSC_BLOCK_SIZE),
            (Region::Cmu, cmu::BASE, CMU_BLOCK_SIZE),
        ];

        map.iter()
            .find(|(_, start, size)| {
                addr >= *start && u64::from(addr - start) + len <= u64::from(*size)
            })
            .map(|(region, start, _)| (*region, (addr - start) as usize))
            .ok_or(Error::MemoryAccess { addr })
    }

    /// Lock state of the flash page holding `addr`, `None` if not flash
    fn page_locked(&self, addr: u32) -> Option<bool> {
        let ulw = self.lock_word(word::ULW);
        match self.locate(addr, 4).ok()?.0 {
            Region::Main => {
                let page = (addr - self.config.main_base()) / self.config.page_size();
                let plw = self.lock_word((page / 32) as usize);
                Some(plw & (1 << (page % 32)) == 0)
            }
            Region::UserData => Some(ulw & word::ULW_USER_DATA == 0),
            Region::LockBits => Some(ulw & word::ULW_LOCK_BITS == 0),
            _ => None,
        }
    }

    fn flash_mut(&mut self, region: Region) -> &mut Vec<u8> {
        match region {
            Region::UserData => &mut self.user_data,
            Region::LockBits => &mut self.lock_bits,
            _ => &mut self.main,
        }
    }

    fn status_bits(&mut self) -> u32 {
        if !self.msc_clock_enabled() {
            return 0;
        }
        let mut status = MscStatus::WDATAREADY.bits() | self.msc.error;
        if self.msc.busy_remaining > 0 {
            self.msc.busy_remaining -= 1;
            status |= MscStatus::BUSY.bits();
            status &= !MscStatus::WDATAREADY.bits();
        }
        (status | self.forced_status) & !self.masked_status
    }

    fn msc_read(&mut self, offset: u32) -> u32 {
        if !self.msc_clock_enabled() {
            return 0;
        }
        match offset {
            regs::WRITECTRL => self.msc.writectrl,
            regs::ADDRB => self.msc.addrb,
            regs::STATUS => self.status_bits(),
            regs::LOCK => u32::from(!self.msc.unlocked),
            _ => 0,
        }
    }

    fn msc_write(&mut self, offset: u32, value: u32) {
        if !self.msc_clock_enabled() {
            log::debug!("MSC write to 0x{:03X} ignored, clock disabled", offset);
            return;
        }
        match offset {
            regs::LOCK => self.msc.unlocked = value == regs::LOCK_KEY,
            regs::WRITECTRL if self.msc.unlocked => self.msc.writectrl = value,
            regs::ADDRB => self.msc.addrb = value,
            regs::WDATA => self.msc.wdata = value,
            regs::WRITECMD => self.write_cmd(value),
            _ => log::debug!("MSC write to 0x{:03X} ignored", offset),
        }
    }

    fn write_cmd(&mut self, value: u32) {
        if !self.msc.unlocked || !self.write_enabled() {
            log::debug!("WRITECMD 0x{:X} ignored, MSC locked or WREN clear", value);
            return;
        }

        if value & regs::WRITECMD_LADDRIM != 0 {
            let addr = self.msc.addrb;
            self.msc.error = match self.page_locked(addr) {
                None => MscStatus::INVADDR.bits(),
                Some(true) => MscStatus::LOCKED.bits(),
                Some(false) => 0,
            };
            self.msc.latched = Some(addr);
        }

        let Some(addr) = self.msc.latched else {
            return;
        };
        if self.msc.error != 0 {
            return;
        }

        if value & regs::WRITECMD_ERASEPAGE != 0 {
            self.erase_page(addr);
        }

        if value & regs::WRITECMD_WRITEONCE != 0 {
            self.program_word(addr, self.msc.wdata);
            self.msc.latched = Some(addr + 4);
        }
    }

    fn erase_page(&mut self, addr: u32) {
        let Ok((region, offset)) = self.locate(addr, 1) else {
            return;
        };
        let page_size = self.config.page_size() as usize;
        let start = offset - offset % page_size;
        let page = self.flash_mut(region);
        let end = (start + page_size).min(page.len());
        page[start..end].fill(0xFF);

        self.counters.erases += 1;
        self.msc.busy_remaining = self.busy_cycles;
    }

    fn program_word(&mut self, addr: u32, value: u32) {
        let Ok((region, offset)) = self.locate(addr, 4) else {
            return;
        };
        let mem = self.flash_mut(region);
        for (byte, new) in mem[offset..offset + 4].iter_mut().zip(value.to_le_bytes()) {
            *byte &= new;
        }

        self.counters.word_writes += 1;
        self.msc.busy_remaining = self.busy_cycles;
    }

    fn run_write_routine(&mut self, run: &mut AlgorithmRun<'_>) -> Result<()> {
        let mut code = [0u8; WRITE_ALGORITHM.len()];
        self.read_bytes(run.entry, &mut code)?;
        if code != WRITE_ALGORITHM {
            log::error!("unexpected flash routine at 0x{:08X}", run.entry);
            return Err(Error::AlgorithmFailed);
        }

        let (Some(base), Some(count), Some(start), Some(end), Some(mut dest)) = (
            run.param("r0"),
            run.param("r1"),
            run.param("r2"),
            run.param("r3"),
            run.param("r4"),
        ) else {
            return Err(Error::AlgorithmFailed);
        };

        if base != self.config.msc_base || start != run.fifo.address || end != run.fifo.end() {
            return Err(Error::AlgorithmFailed);
        }
        if end.saturating_sub(start) < 12 || run.data.len() < count as usize * 4 {
            return Err(Error::AlgorithmFailed);
        }

        let ring_start = start + 8;
        let mut rp = ring_start;
        let fail = Error::AlgorithmFailed;

        self.msc_write(regs::WRITECTRL, regs::WRITECTRL_WREN);

        for chunk in run.data.chunks_exact(4).take(count as usize) {
            // Host side: stream the next word into the ring
            let (_, off) = self.locate(rp, 4)?;
            self.ram[off..off + 4].copy_from_slice(chunk);

            // Routine side
            self.msc_write(regs::ADDRB, dest);
            self.msc_write(regs::WRITECMD, regs::WRITECMD_LADDRIM);
            let status = self.status_bits();
            if status & (MscStatus::LOCKED | MscStatus::INVADDR).bits() != 0 {
                run.set_param("r0", status);
                run.set_param("r4", dest);
                return Err(fail);
            }
            if status & MscStatus::WDATAREADY.bits() == 0 {
                log::error!("flash routine stuck waiting for WDATAREADY");
                return Err(Error::Timeout);
            }

            let word = u32::from_le_bytes([
                self.ram[off],
                self.ram[off + 1],
                self.ram[off + 2],
                self.ram[off + 3],
            ]);
            self.msc_write(regs::WDATA, word);
            self.msc_write(regs::WRITECMD, regs::WRITECMD_WRITEONCE);
            dest += 4;

            while self.status_bits() & MscStatus::BUSY.bits() != 0 {
                if self.forced_status & MscStatus::BUSY.bits() != 0 {
                    log::error!("flash routine stuck waiting for BUSY");
                    return Err(Error::Timeout);
                }
            }

            rp += 4;
            if rp >= end {
                rp = ring_start;
            }
        }

        run.set_param("r0", 0);
        run.set_param("r4", dest);
        Ok(())
    }
}

impl Target for DummyTarget {
    fn id(&self) -> TargetId {
        self.id
    }

    fn core(&self) -> CoreType {
        CoreType::from_partno(self.config.cpu_partno)
    }

    fn is_halted(&self) -> bool {
        self.halted
    }

    fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        let (region, off) = self.locate(addr, buf.len())?;
        let end = off + buf.len();
        match region {
            Region::Main => buf.copy_from_slice(&self.main[off..end]),
            Region::UserData => buf.copy_from_slice(&self.user_data[off..end]),
            Region::LockBits => buf.copy_from_slice(&self.lock_bits[off..end]),
            Region::DevInfo => buf.copy_from_slice(&self.dev_info[off..end]),
            Region::Ram => buf.copy_from_slice(&self.ram[off..end]),
            Region::Msc => {
                if buf.len() != 4 || off % 4 != 0 {
                    return Err(Error::MemoryAccess { addr });
                }
                if off as u32 == regs::STATUS {
                    self.counters.status_reads += 1;
                }
                let value = self.msc_read(off as u32);
                buf.copy_from_slice(&value.to_le_bytes());
            }
            Region::Cmu => buf.fill(0),
        }
        Ok(())
    }

    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let (region, off) = self.locate(addr, data.len())?;
        match region {
            Region::Ram => {
                self.ram[off..off + data.len()].copy_from_slice(data);
                Ok(())
            }
            Region::Msc | Region::Cmu if data.len() == 4 && off % 4 == 0 => {
                let value = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
                if region == Region::Msc {
                    self.counters.register_writes += 1;
                    self.msc_write(off as u32, value);
                } else if addr == cmu::CLKEN1_SET {
                    self.clken1 |= value;
                }
                Ok(())
            }
            _ => Err(Error::MemoryAccess { addr }),
        }
    }

    fn alloc_work_area(&mut self, size: u32) -> Result<WorkArea> {
        let size = (size + 3) & !3;
        let limit = RAM_BASE + self.ram.len() as u32;

        let mut candidate = RAM_BASE;
        for area in &self.areas {
            if candidate + size <= area.address {
                break;
            }
            candidate = candidate.max((area.end() + 3) & !3);
        }
        if size == 0 || candidate + size > limit {
            return Err(Error::ResourceExhausted);
        }

        let area = WorkArea {
            address: candidate,
            size,
        };
        let pos = self.areas.partition_point(|a| a.address < candidate);
        self.areas.insert(pos, area);
        Ok(area)
    }

    fn free_work_area(&mut self, area: WorkArea) {
        self.areas.retain(|a| *a != area);
    }

    fn run_flash_algorithm(&mut self, run: &mut AlgorithmRun<'_>) -> Result<()> {
        if !self.config.algorithm_support {
            return Err(Error::ResourceExhausted);
        }
        self.counters.algorithm_runs += 1;
        self.run_write_routine(run)
    }

    fn keep_alive(&mut self) {
        self.counters.keep_alives += 1;
    }

    fn alive_sleep(&mut self, ticks: u32) {
        self.counters.sleeps += ticks;
    }
}

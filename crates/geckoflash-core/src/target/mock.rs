//! Scripted target for unit tests

use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;

use super::{AlgorithmRun, CoreType, Target, TargetId, WorkArea};
use crate::error::{Error, Result};
use crate::msc::regs;

/// Sparse memory target with a scripted MSC STATUS register
pub(crate) struct MockTarget {
    pub mem: BTreeMap<u32, u8>,
    pub core: CoreType,
    pub halted: bool,
    /// STATUS value once the script runs out
    pub status: u32,
    pub status_script: VecDeque<u32>,
    pub status_reads: usize,
    pub sleeps: usize,
    pub keep_alives: usize,
    /// Log of 32-bit writes
    pub writes: Vec<(u32, u32)>,
    /// Reads touching this address fail
    pub fail_read_at: Option<u32>,
    /// Largest work area that can be allocated
    pub max_area: u32,
    pub alloc_requests: Vec<u32>,
    pub live_areas: Vec<WorkArea>,
    next_area: u32,
    /// Result and final (r0, r4) of every algorithm run
    pub algorithm_outcome: Option<(u32, u32)>,
    pub runs: usize,
}

impl MockTarget {
    pub fn new() -> Self {
        Self {
            mem: BTreeMap::new(),
            core: CoreType::CortexM33,
            halted: true,
            status: 0,
            status_script: VecDeque::new(),
            status_reads: 0,
            sleeps: 0,
            keep_alives: 0,
            writes: Vec::new(),
            fail_read_at: None,
            max_area: 0x8000,
            alloc_requests: Vec::new(),
            live_areas: Vec::new(),
            next_area: 0x2000_0000,
            algorithm_outcome: None,
            runs: 0,
        }
    }

    pub fn poke_u32(&mut self, addr: u32, value: u32) {
        for (i, b) in value.to_le_bytes().iter().enumerate() {
            self.mem.insert(addr + i as u32, *b);
        }
    }

    pub fn poke(&mut self, addr: u32, data: &[u8]) {
        for (i, b) in data.iter().enumerate() {
            self.mem.insert(addr + i as u32, *b);
        }
    }

    pub fn peek_u32(&self, addr: u32) -> u32 {
        let mut buf = [0u8; 4];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.mem.get(&(addr + i as u32)).copied().unwrap_or(0);
        }
        u32::from_le_bytes(buf)
    }

    fn status_addr() -> u32 {
        regs::MSC_BASE + regs::STATUS
    }
}

impl Target for MockTarget {
    fn id(&self) -> TargetId {
        TargetId(0)
    }

    fn core(&self) -> CoreType {
        self.core
    }

    fn is_halted(&self) -> bool {
        self.halted
    }

    fn read_bytes(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        if let Some(bad) = self.fail_read_at {
            if (addr..addr + buf.len() as u32).contains(&bad) {
                return Err(Error::MemoryAccess { addr });
            }
        }
        if addr == Self::status_addr() && buf.len() == 4 {
            self.status_reads += 1;
            let status = self.status_script.pop_front().unwrap_or(self.status);
            buf.copy_from_slice(&status.to_le_bytes());
            return Ok(());
        }
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.mem.get(&(addr + i as u32)).copied().unwrap_or(0);
        }
        Ok(())
    }

    fn write_bytes(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        if data.len() == 4 {
            let value = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
            self.writes.push((addr, value));
        }
        self.poke(addr, data);
        Ok(())
    }

    fn alloc_work_area(&mut self, size: u32) -> Result<WorkArea> {
        self.alloc_requests.push(size);
        if size > self.max_area {
            return Err(Error::ResourceExhausted);
        }
        let area = WorkArea {
            address: self.next_area,
            size,
        };
        self.next_area += (size + 3) & !3;
        self.live_areas.push(area);
        Ok(area)
    }

    fn free_work_area(&mut self, area: WorkArea) {
        self.live_areas.retain(|a| *a != area);
    }

    fn run_flash_algorithm(&mut self, run: &mut AlgorithmRun<'_>) -> Result<()> {
        self.runs += 1;
        match self.algorithm_outcome {
            None => Ok(()),
            Some((r0, r4)) => {
                run.set_param("r0", r0);
                run.set_param("r4", r4);
                Err(Error::AlgorithmFailed)
            }
        }
    }

    fn alive_sleep(&mut self, _ticks: u32) {
        self.sleeps += 1;
    }

    fn keep_alive(&mut self) {
        self.keep_alives += 1;
    }
}

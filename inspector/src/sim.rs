//! A simulated controller for the test suite: a register file behind the
//! select/window surface that records every access it sees.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use x86_64::PhysAddr;

use crate::error::{Error, KResult};
use crate::ioapic::{IOREGSEL, IOWIN};
use crate::memory::{AddressMapper, MappedRegion};

/// The internal register file, addressed by register index.
pub(crate) struct RegisterFile {
    regs: BTreeMap<u32, u32>,
    select: u32,
    /// Every value written to the select register, in order.
    pub select_writes: Vec<u32>,
    /// Number of window reads performed.
    pub window_reads: usize,
    /// Every window write as (selected index, value), in order.
    pub window_writes: Vec<(u32, u32)>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            regs: BTreeMap::new(),
            select: 0,
            select_writes: Vec::new(),
            window_reads: 0,
            window_writes: Vec::new(),
        }
    }

    /// A plausible controller: `id`, `version`, and `pins` redirection
    /// entries, each masked with vector `0x30 + n` routed to APIC `n`.
    pub fn with_pins(id: u8, version: u8, pins: u32) -> Self {
        let mut file = Self::new();
        file.set(0x00, (id as u32) << 24);
        file.set(0x01, ((pins - 1) << 16) | version as u32);
        for n in 0..pins {
            file.set(0x10 + 2 * n, 0x0001_0000 | (0x30 + n));
            file.set(0x11 + 2 * n, n << 24);
        }
        file
    }

    pub fn set(&mut self, index: u32, value: u32) {
        self.regs.insert(index, value);
    }

    fn read(&self, index: u32) -> u32 {
        self.regs.get(&index).copied().unwrap_or(0)
    }
}

/// The two externally visible registers over a shared register file.
pub(crate) struct SimRegion {
    file: Rc<RefCell<RegisterFile>>,
    released: Rc<Cell<bool>>,
}

impl MappedRegion for SimRegion {
    fn read_u32(&self, offset: usize) -> u32 {
        let mut file = self.file.borrow_mut();
        match offset {
            IOREGSEL => file.select,
            IOWIN => {
                file.window_reads += 1;
                let select = file.select;
                file.read(select)
            }
            _ => 0,
        }
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        let mut file = self.file.borrow_mut();
        match offset {
            IOREGSEL => {
                file.select = value;
                file.select_writes.push(value);
            }
            IOWIN => {
                let select = file.select;
                file.window_writes.push((select, value));
                file.set(select, value);
            }
            _ => {}
        }
    }
}

impl Drop for SimRegion {
    fn drop(&mut self) {
        self.released.set(true);
    }
}

/// Address mapper handing out [`SimRegion`]s, or refusing to map at all.
pub(crate) struct SimMapper {
    file: Rc<RefCell<RegisterFile>>,
    released: Rc<Cell<bool>>,
    fail_mapping: bool,
}

impl SimMapper {
    pub fn new(file: RegisterFile) -> Self {
        Self {
            file: Rc::new(RefCell::new(file)),
            released: Rc::new(Cell::new(false)),
            fail_mapping: false,
        }
    }

    pub fn failing(file: RegisterFile) -> Self {
        Self {
            fail_mapping: true,
            ..Self::new(file)
        }
    }

    /// Shared handle onto the register file for assertions.
    pub fn file(&self) -> Rc<RefCell<RegisterFile>> {
        self.file.clone()
    }

    /// True once the most recently mapped region has been dropped.
    pub fn released(&self) -> Rc<Cell<bool>> {
        self.released.clone()
    }
}

impl AddressMapper for SimMapper {
    type Region = SimRegion;

    fn map(&self, _base: PhysAddr, _size: usize) -> KResult<Self::Region> {
        if self.fail_mapping {
            return Err(Error::MappingUnavailable);
        }
        self.released.set(false);
        Ok(SimRegion {
            file: self.file.clone(),
            released: self.released.clone(),
        })
    }
}

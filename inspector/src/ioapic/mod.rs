//! Register-level access to the Intel 82093 I/O Advanced Programmable
//! Interrupt Controller (IOAPIC).
//!
//! The controller exposes only two 32-bit registers in its memory-mapped
//! block: a register-select at offset 0x00 and a data window at offset 0x10.
//! Every internal register, whatever its meaning, is reached by writing its
//! 8-bit index to the select register and then accessing the window. The
//! internal file holds the identification register, the version register and
//! the redirection table, one 64-bit entry per interrupt input pin split
//! over an even/odd pair of 32-bit indices.
//!
//! The select register is shared state between the two halves of every
//! access, so the host must guarantee that nothing else touches the
//! controller while a select/window pair is in flight. This layer performs
//! no locking of its own.

use bit_field::BitField;

use crate::memory::MappedRegion;

pub mod inspect;
pub mod report;

use report::{IdentificationInfo, RedirectionEntry, VersionInfo};

/// Physical base address of the register block, from the 82093 datasheet.
pub const DEFAULT_IOAPIC_ADDR: u64 = 0xfec0_0000;

/// Byte offset of the register-select (IOREGSEL) within the block.
pub const IOREGSEL: usize = 0x00;
/// Byte offset of the data window (IOWIN) within the block.
pub const IOWIN: usize = 0x10;

/// Identification register index (bits 27:24 hold the 4-bit id).
pub const IOAPICID: u8 = 0x00;
/// Version register index (bits 7:0 version, bits 23:16 max entry).
pub const IOAPICVER: u8 = 0x01;
/// Arbitration id register index.
pub const IOAPICARB: u8 = 0x02;
/// First redirection-table index; entry `n` occupies `0x10 + 2n` (low half)
/// and `0x11 + 2n` (high half).
pub const IOREDTBL_BASE: u8 = 0x10;
/// Last addressable redirection-table index.
pub const IOREDTBL_MAX: u8 = 0x3f;

/// Redirection pairs addressable through the fixed index window.
pub const MAX_REDIRECTION_PAIRS: usize = ((IOREDTBL_MAX - IOREDTBL_BASE + 1) / 2) as usize;

#[inline(always)]
fn redirection_entry_low(n: u8) -> u8 {
    IOREDTBL_BASE + 2 * n
}

#[inline(always)]
fn redirection_entry_high(n: u8) -> u8 {
    IOREDTBL_BASE + 2 * n + 1
}

/// The indirect register protocol, driven over a borrowed mapped region.
///
/// The region stays owned by the caller; this type only sequences the
/// select/window accesses. It can exist solely for a region that was mapped
/// successfully, so a failed mapping never reaches a register access.
pub struct IoApic<'a, R: MappedRegion> {
    region: &'a mut R,
}

impl<'a, R: MappedRegion> IoApic<'a, R> {
    pub fn new(region: &'a mut R) -> Self {
        Self { region }
    }

    /// Reads the internal register at `reg`.
    ///
    /// Selects first, then reads the window; the order is what gives the
    /// window its meaning.
    pub fn read_register(&mut self, reg: u8) -> u32 {
        self.region.write_u32(IOREGSEL, reg as u32);
        self.region.read_u32(IOWIN)
    }

    /// Writes `val` to the internal register at `reg`. Symmetric to
    /// [`read_register`](Self::read_register); unused by the read-only
    /// inspection path.
    pub fn write_register(&mut self, reg: u8, val: u32) {
        self.region.write_u32(IOREGSEL, reg as u32);
        self.region.write_u32(IOWIN, val);
    }

    /// Reads the identification register.
    pub fn identification(&mut self) -> IdentificationInfo {
        IdentificationInfo {
            id: self.read_register(IOAPICID).get_bits(24..28) as u8,
        }
    }

    /// Reads the version register once and decodes both fields.
    pub fn version(&mut self) -> VersionInfo {
        let raw = self.read_register(IOAPICVER);
        VersionInfo {
            version: raw.get_bits(0..8) as u8,
            max_redirection_entries: raw.get_bits(16..24) as usize + 1,
        }
    }

    /// Reads redirection entry `n`, low half before high half.
    pub fn redirection_entry(&mut self, n: u8) -> RedirectionEntry {
        debug_assert!(
            (n as usize) < MAX_REDIRECTION_PAIRS,
            "redirection entry index out of range"
        );
        let low = self.read_register(redirection_entry_low(n));
        let high = self.read_register(redirection_entry_high(n));
        RedirectionEntry::from_halves(n, low, high)
    }
}

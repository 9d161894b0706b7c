//! The inspection report: what one enumeration run observed, plus its
//! rendering for the diagnostic sink.

use alloc::vec::Vec;
use core::fmt;

use bit_field::BitField;
use bitflags::bitflags;

use crate::{kdebug, kinfo};

/// Contents of the identification register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IdentificationInfo {
    /// The 4-bit controller id, bits 27:24.
    pub id: u8,
}

/// Contents of the version register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VersionInfo {
    /// Implementation version, bits 7:0.
    pub version: u8,
    /// Interrupt input pins: bits 23:16 plus one. Always in 1..=256.
    pub max_redirection_entries: usize,
}

bitflags! {
    /// Flag bits of a redirection entry's low half.
    pub struct RedirectionFlags: u32 {
        /// Destination field names a logical group rather than an APIC id.
        const LOGICAL_DESTINATION = 1 << 11;
        /// Delivery of a previous interrupt is still pending.
        const SEND_PENDING = 1 << 12;
        /// The pin is active-low.
        const ACTIVE_LOW = 1 << 13;
        /// A level interrupt has been accepted but not yet acknowledged.
        const REMOTE_IRR = 1 << 14;
        /// The pin is level-triggered rather than edge-triggered.
        const LEVEL_TRIGGERED = 1 << 15;
        /// The pin is masked.
        const MASKED = 1 << 16;
    }
}

/// How an interrupt is signalled to its destination, bits 10:8 of an entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeliveryMode {
    Fixed,
    LowestPriority,
    Smi,
    Nmi,
    Init,
    ExtInt,
    Reserved(u8),
}

impl From<u8> for DeliveryMode {
    fn from(raw: u8) -> Self {
        match raw {
            0 => DeliveryMode::Fixed,
            1 => DeliveryMode::LowestPriority,
            2 => DeliveryMode::Smi,
            4 => DeliveryMode::Nmi,
            5 => DeliveryMode::Init,
            7 => DeliveryMode::ExtInt,
            other => DeliveryMode::Reserved(other),
        }
    }
}

/// One 64-bit redirection entry, assembled from its two 32-bit halves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RedirectionEntry {
    index: u8,
    raw: u64,
}

impl RedirectionEntry {
    pub fn from_halves(index: u8, low: u32, high: u32) -> Self {
        Self {
            index,
            raw: ((high as u64) << 32) | low as u64,
        }
    }

    /// The pin this entry routes.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The full 64-bit value.
    pub fn raw(&self) -> u64 {
        self.raw
    }

    pub fn low(&self) -> u32 {
        self.raw as u32
    }

    pub fn high(&self) -> u32 {
        (self.raw >> 32) as u32
    }

    /// Interrupt vector raised at the destination, bits 7:0.
    pub fn vector(&self) -> u8 {
        self.raw.get_bits(0..8) as u8
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        DeliveryMode::from(self.raw.get_bits(8..11) as u8)
    }

    /// Destination APIC id (or logical group), bits 63:56.
    pub fn destination(&self) -> u8 {
        self.raw.get_bits(56..64) as u8
    }

    pub fn flags(&self) -> RedirectionFlags {
        RedirectionFlags::from_bits_truncate(self.raw as u32)
    }

    pub fn masked(&self) -> bool {
        self.flags().contains(RedirectionFlags::MASKED)
    }
}

/// Everything one inspection run observed. Built once, immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InspectionReport {
    pub identification: IdentificationInfo,
    pub version: VersionInfo,
    pub entries: Vec<RedirectionEntry>,
}

impl InspectionReport {
    /// Emits the report through the logging facade, one record per rendered
    /// row. Summary rows go out at info level; the decoded per-pin detail at
    /// debug level. The whole dump holds the log lock so rows of concurrent
    /// dumps cannot interleave.
    pub fn log(&self) {
        let _dump = crate::logging::LOG_LOCK.lock();

        kinfo!(
            "ioapic id={:#04x} version={:#04x} redirection entries={}",
            self.identification.id,
            self.version.version,
            self.version.max_redirection_entries
        );
        for row in self.entries.chunks(ENTRIES_PER_ROW) {
            kinfo!("{}", EntryRow(row));
        }
        for entry in &self.entries {
            kdebug!(
                "pin {:#04x} vector={:#04x} delivery={:?} destination={:#04x} flags={:?}",
                entry.index(),
                entry.vector(),
                entry.delivery_mode(),
                entry.destination(),
                entry.flags()
            );
        }
    }
}

const ENTRIES_PER_ROW: usize = 3;

struct EntryRow<'a>(&'a [RedirectionEntry]);

impl fmt::Display for EntryRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("  ")?;
            }
            // High half first: one 64-bit hexadecimal value per pin.
            write!(f, "{:#04x}: {:08X}{:08X}", entry.index(), entry.high(), entry.low())?;
        }
        Ok(())
    }
}

impl fmt::Display for InspectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ioapic id={:#04x} version={:#04x} redirection entries={}",
            self.identification.id, self.version.version, self.version.max_redirection_entries
        )?;
        for row in self.entries.chunks(ENTRIES_PER_ROW) {
            writeln!(f, "  {}", EntryRow(row))?;
        }
        Ok(())
    }
}

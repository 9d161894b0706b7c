//! The controller enumerator: one linear acquire, read, release pipeline
//! per call, producing an [`InspectionReport`].

use alloc::vec::Vec;

use x86_64::PhysAddr;

use crate::error::{Error, KResult};
use crate::memory::{AddressMapper, PAGE_SIZE};
use crate::{kdebug, kerror};

use super::report::InspectionReport;
use super::{IoApic, DEFAULT_IOAPIC_ADDR, MAX_REDIRECTION_PAIRS};

/// Drives the register protocol over a host-provided mapper to enumerate one
/// controller. The mapped region is acquired per inspection call and owned
/// by that call alone; dropping it on any exit path releases the mapping.
pub struct IoApicInspector<M: AddressMapper> {
    mapper: M,
    base: PhysAddr,
}

impl<M: AddressMapper> IoApicInspector<M> {
    /// An inspector for the controller at the datasheet base address.
    pub fn new(mapper: M) -> Self {
        Self::with_base(mapper, PhysAddr::new(DEFAULT_IOAPIC_ADDR))
    }

    /// An inspector for a controller whose base was discovered elsewhere
    /// (the ACPI MADT reports one per controller).
    pub fn with_base(mapper: M, base: PhysAddr) -> Self {
        Self { mapper, base }
    }

    /// Reads identification, version and the full redirection table.
    ///
    /// All-or-nothing: any failure yields an error and no partial report,
    /// with the mapping (if it was established) released before returning.
    pub fn inspect(&self) -> KResult<InspectionReport> {
        let mut region = self.mapper.map(self.base, PAGE_SIZE)?;
        let mut ioapic = IoApic::new(&mut region);

        let identification = ioapic.identification();
        let version = ioapic.version();
        kdebug!(
            "ioapic at {:?}: id={:#04x} version={:#04x} pins={}",
            self.base,
            identification.id,
            version.version,
            version.max_redirection_entries
        );

        // The hardware-reported pin count is unbounded; the index window is
        // not. Refuse to read past it rather than aliasing other registers.
        if version.max_redirection_entries > MAX_REDIRECTION_PAIRS {
            return Err(Error::RedirectionTableOverflow);
        }

        let mut entries = Vec::with_capacity(version.max_redirection_entries);
        for n in 0..version.max_redirection_entries {
            entries.push(ioapic.redirection_entry(n as u8));
        }

        Ok(InspectionReport {
            identification,
            version,
            entries,
        })
    }

    /// The lifecycle entry point: inspect, emit the report through the
    /// logging sink, hand the report back. All resources are released
    /// before this returns; there is nothing left for an exit hook to undo.
    pub fn run(&self) -> KResult<InspectionReport> {
        match self.inspect() {
            Ok(report) => {
                report.log();
                Ok(report)
            }
            Err(err) => {
                kerror!("ioapic inspection failed: {}", err);
                Err(err)
            }
        }
    }
}

//! Diagnostic inspection of the Intel 82093 I/O APIC.
//!
//! Reads the controller's memory-mapped configuration registers through the
//! select/window indirect protocol and reports its identification, version,
//! pin capacity and full redirection table. Read-only: nothing here changes
//! interrupt routing.
//!
//! The host supplies the physical-to-virtual mapping through
//! [`memory::AddressMapper`]; an [`IoApicInspector`] drives one mapped
//! enumeration pass per call and hands back an [`InspectionReport`],
//! which renders itself for a console or through the `log` facade.

#![no_std]
#![allow(clippy::new_without_default)]

extern crate alloc;

pub mod error;
pub mod ioapic;
pub mod logging;
pub mod memory;

#[cfg(test)]
mod sim;

pub use error::{Error, KResult};
pub use ioapic::inspect::IoApicInspector;
pub use ioapic::report::InspectionReport;
pub use memory::{AddressMapper, LinearOffsetMapper, MappedRegion};

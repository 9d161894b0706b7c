//! The address-mapping boundary.
//!
//! The inspector never touches a raw physical address. A host-provided
//! [`AddressMapper`] turns the controller's physical base into a
//! [`MappedRegion`], and every register access goes through that region's
//! 32-bit accessors. Dropping the region releases the mapping, so a scoped
//! acquisition is released on every exit path.

use x86_64::{PhysAddr, VirtAddr};

use crate::error::KResult;

/// Smallest mapping the inspector will request.
pub const PAGE_SIZE: usize = 0x1000;

/// A contiguous range of addressable memory backing a device register block.
///
/// Offsets are in bytes from the region base. Accesses are 32-bit wide; the
/// controller ignores other widths. An out-of-range or misaligned offset is
/// a caller bug.
pub trait MappedRegion {
    /// Reads the 32-bit value at `offset`.
    fn read_u32(&self, offset: usize) -> u32;

    /// Writes a 32-bit value at `offset`.
    fn write_u32(&mut self, offset: usize, value: u32);
}

/// The host facility that maps a physical range into the current address
/// space. Releasing the mapping is the drop of the returned region.
pub trait AddressMapper {
    type Region: MappedRegion;

    /// Maps `size` bytes starting at physical address `base`.
    ///
    /// Fails with [`Error::MappingUnavailable`](crate::Error::MappingUnavailable)
    /// when the mapping cannot be established; the caller must not retry.
    fn map(&self, base: PhysAddr, size: usize) -> KResult<Self::Region>;
}

/// Mapper for environments where physical memory is visible at a fixed
/// linear offset (an offset of zero means identity mapping).
pub struct LinearOffsetMapper {
    offset: u64,
}

impl LinearOffsetMapper {
    /// Creates a mapper translating `phys` to `phys + offset`.
    ///
    /// # Safety
    ///
    /// The caller must guarantee that the whole physical range handed to
    /// [`AddressMapper::map`] is accessible at `phys + offset` with device
    /// memory semantics for as long as the returned regions live.
    pub const unsafe fn new(offset: u64) -> Self {
        Self { offset }
    }
}

impl AddressMapper for LinearOffsetMapper {
    type Region = LinearRegion;

    fn map(&self, base: PhysAddr, size: usize) -> KResult<Self::Region> {
        let virt = VirtAddr::new(base.as_u64() + self.offset);
        Ok(LinearRegion {
            base: virt.as_u64() as usize,
            size,
        })
    }
}

/// A register block reached through a linear mapping. Nothing to undo on
/// drop; the linear mapping outlives the region by construction.
pub struct LinearRegion {
    base: usize,
    size: usize,
}

impl MappedRegion for LinearRegion {
    #[inline(always)]
    fn read_u32(&self, offset: usize) -> u32 {
        debug_assert!(offset + 4 <= self.size, "read_u32 offset out of bounds");
        debug_assert!(offset % 4 == 0, "read_u32 offset misaligned");
        // SAFETY: the mapper's constructor guarantees this range is mapped.
        unsafe { ((self.base + offset) as *const u32).read_volatile() }
    }

    #[inline(always)]
    fn write_u32(&mut self, offset: usize, value: u32) {
        debug_assert!(offset + 4 <= self.size, "write_u32 offset out of bounds");
        debug_assert!(offset % 4 == 0, "write_u32 offset misaligned");
        // SAFETY: the mapper's constructor guarantees this range is mapped.
        unsafe { ((self.base + offset) as *mut u32).write_volatile(value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A stack buffer stands in for the device page; the "physical" address
    // zero maps onto the buffer through the linear offset.
    fn buffer_mapper(buf: &mut [u32]) -> LinearOffsetMapper {
        unsafe { LinearOffsetMapper::new(buf.as_mut_ptr() as u64) }
    }

    #[test]
    fn linear_region_reads_through_offset() {
        let mut buf = [0x1111_2222u32, 0x3333_4444, 0xAAAA_BBBB, 0];
        let size = core::mem::size_of_val(&buf);
        let mapper = buffer_mapper(&mut buf);
        let region = mapper.map(PhysAddr::new(0), size).unwrap();

        assert_eq!(region.read_u32(0), 0x1111_2222);
        assert_eq!(region.read_u32(8), 0xAAAA_BBBB);
    }

    #[test]
    fn linear_region_writes_through_offset() {
        let mut buf = [0u32; 4];
        let size = core::mem::size_of_val(&buf);
        let mapper = buffer_mapper(&mut buf);
        let mut region = mapper.map(PhysAddr::new(0), size).unwrap();

        region.write_u32(4, 0xDEAD_BEEF);
        assert_eq!(region.read_u32(4), 0xDEAD_BEEF);
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_read_is_rejected() {
        let mut buf = [0u32; 4];
        let size = core::mem::size_of_val(&buf);
        let mapper = buffer_mapper(&mut buf);
        let region = mapper.map(PhysAddr::new(0), size).unwrap();

        region.read_u32(16);
    }
}

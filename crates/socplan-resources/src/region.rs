//! Memory regions and the shadow address window.
//!
//! Every bus slave window is visible twice: at its base address (cached) and
//! at `base + shadow_offset` (uncached). Primary windows live below the
//! shadow offset and must not overlap.

use serde::{Deserialize, Serialize};

use crate::error::{ResourceError, Result};
use crate::kind::ResourceKind;
use crate::table::ResourceTable;

/// Platform addressing constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AddressSpace {
    /// Offset of the uncached alias of every region.
    pub shadow_offset: u64,
    /// Smallest addressable unit in bytes; region sizes must be multiples of it.
    pub granularity: u64,
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self {
            shadow_offset: 0x8000_0000,
            granularity: 4,
        }
    }
}

/// A registered memory region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MemoryRegion {
    pub name: String,
    pub base_address: u64,
    pub size: u64,
    /// Uncached alias of `base_address`.
    pub shadow_address: u64,
}

impl MemoryRegion {
    /// One past the last byte of the primary window.
    pub fn end(&self) -> u64 {
        self.base_address + self.size
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.base_address && address < self.end()
    }

    fn overlaps(&self, base: u64, end: u64) -> bool {
        self.base_address < end && base < self.end()
    }
}

/// A region size request whose base comes from the merged memory map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRequest {
    pub name: String,
    pub size: u64,
}

impl RegionRequest {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Collision-free set of memory regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMap {
    space: AddressSpace,
    regions: Vec<MemoryRegion>,
}

impl MemoryMap {
    pub fn new(space: AddressSpace) -> Self {
        Self {
            space,
            regions: Vec::new(),
        }
    }

    pub fn space(&self) -> &AddressSpace {
        &self.space
    }

    /// Register a region at `base` with `size` bytes.
    pub fn register(&mut self, name: &str, base: u64, size: u64) -> Result<&MemoryRegion> {
        let granularity = self.space.granularity.max(1);
        if size == 0 || size % granularity != 0 {
            return Err(ResourceError::UnsatisfiableRegionSize {
                name: name.into(),
                size,
                granularity,
            });
        }

        let outside = || ResourceError::RegionOutsideWindow {
            name: name.into(),
            base,
            size,
            shadow_offset: self.space.shadow_offset,
        };
        let end = match base.checked_add(size) {
            Some(end) if end <= self.space.shadow_offset => end,
            _ => return Err(outside()),
        };
        // The whole shadow window must be addressable too.
        let shadow_address = base
            .checked_add(self.space.shadow_offset)
            .filter(|shadow| shadow.checked_add(size).is_some())
            .ok_or_else(outside)?;

        if let Some(existing) = self.regions.iter().find(|r| r.name == name) {
            return Err(ResourceError::Collision {
                kind: ResourceKind::MemoryBase,
                existing: existing.name.clone(),
                incoming: name.into(),
                value: base,
            });
        }
        if let Some(existing) = self.regions.iter().find(|r| r.overlaps(base, end)) {
            return Err(ResourceError::RegionOverlap {
                existing: existing.name.clone(),
                existing_base: existing.base_address,
                existing_size: existing.size,
                incoming: name.into(),
                incoming_base: base,
                incoming_size: size,
            });
        }

        log::debug!("region {name}: {base:#010x}..{end:#010x} (shadow {shadow_address:#010x})");
        self.regions.push(MemoryRegion {
            name: name.into(),
            base_address: base,
            size,
            shadow_address,
        });
        Ok(&self.regions[self.regions.len() - 1])
    }

    /// Register every request at the base address the table assigns it.
    pub fn register_requests(
        &mut self,
        table: &ResourceTable,
        requests: &[RegionRequest],
    ) -> Result<()> {
        for request in requests {
            let base = table
                .lookup(ResourceKind::MemoryBase, &request.name)
                .ok_or_else(|| ResourceError::MissingRegionBase {
                    name: request.name.clone(),
                })?;
            self.register(&request.name, base, request.size)?;
        }
        Ok(())
    }

    pub fn region(&self, name: &str) -> Option<&MemoryRegion> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Region containing `address` in either window.
    pub fn find(&self, address: u64) -> Option<&MemoryRegion> {
        let primary = if address >= self.space.shadow_offset {
            address - self.space.shadow_offset
        } else {
            address
        };
        self.regions.iter().find(|r| r.contains(primary))
    }

    /// Regions in registration order.
    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{merge, ResourceLayer};

    fn map() -> MemoryMap {
        MemoryMap::new(AddressSpace::default())
    }

    #[test]
    fn disjoint_regions_coexist() {
        let mut m = map();
        let fw = m.register("firmware_ram", 0x2000_0000, 0x8000).unwrap();
        assert_eq!(fw.shadow_address, 0xA000_0000);
        let eth = m.register("ethmac", 0x3000_0000, 0x2000).unwrap();
        assert_eq!(eth.shadow_address, 0xB000_0000);
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn overlapping_region_rejected() {
        let mut m = map();
        m.register("firmware_ram", 0x2000_0000, 0x8000).unwrap();
        m.register("ethmac", 0x3000_0000, 0x2000).unwrap();
        let err = m.register("scratch", 0x2000_4000, 0x8000).unwrap_err();
        match err {
            ResourceError::RegionOverlap {
                existing, incoming, ..
            } => {
                assert_eq!(existing, "firmware_ram");
                assert_eq!(incoming, "scratch");
            }
            other => panic!("unexpected {other:?}"),
        }
        // Touching the end is fine.
        assert!(m.register("after", 0x2000_8000, 0x100).is_ok());
        // Starting just before is not.
        assert!(m.register("before", 0x1FFF_FFFC, 0x8).is_err());
    }

    #[test]
    fn partial_word_size_rejected() {
        let mut m = map();
        assert!(matches!(
            m.register("odd", 0x1000_0000, 0x1001),
            Err(ResourceError::UnsatisfiableRegionSize { granularity: 4, .. })
        ));
        assert!(matches!(
            m.register("empty", 0x1000_0000, 0),
            Err(ResourceError::UnsatisfiableRegionSize { .. })
        ));
    }

    #[test]
    fn unaddressable_shadow_window_rejected() {
        let mut m = MemoryMap::new(AddressSpace {
            shadow_offset: u64::MAX,
            granularity: 4,
        });
        assert!(matches!(
            m.register("sram", 0x1000_0000, 0x1000),
            Err(ResourceError::RegionOutsideWindow { .. })
        ));
        assert!(m.is_empty());

        // Shadow base fits but the shadow window runs past the top.
        let mut m = MemoryMap::new(AddressSpace {
            shadow_offset: 0xF000_0000_0000_0000,
            granularity: 4,
        });
        assert!(m.register("low", 0x1000, 0x1000).is_ok());
        assert!(matches!(
            m.register("top", 0x0FFF_FFFF_FFFF_F000, 0x1000),
            Err(ResourceError::RegionOutsideWindow { .. })
        ));
    }

    #[test]
    fn region_must_stay_below_shadow_window() {
        let mut m = map();
        assert!(matches!(
            m.register("high", 0x7FFF_F000, 0x2000),
            Err(ResourceError::RegionOutsideWindow { .. })
        ));
        assert!(m.register("top", 0x7FFF_E000, 0x2000).is_ok());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut m = map();
        m.register("sram", 0x1000_0000, 0x1000).unwrap();
        assert!(matches!(
            m.register("sram", 0x1100_0000, 0x1000),
            Err(ResourceError::Collision { .. })
        ));
    }

    #[test]
    fn find_resolves_shadow_alias() {
        let mut m = map();
        m.register("firmware_ram", 0x2000_0000, 0x8000).unwrap();
        assert_eq!(m.find(0x2000_0010).unwrap().name, "firmware_ram");
        assert_eq!(m.find(0xA000_0010).unwrap().name, "firmware_ram");
        assert!(m.find(0x2000_8000).is_none());
    }

    #[test]
    fn requests_resolve_against_table() {
        let table = merge(
            &ResourceTable::new(),
            &[ResourceLayer::new("soc").mem("rom", 0).mem("sram", 0x1000_0000)],
        )
        .unwrap();
        let mut m = map();
        m.register_requests(
            &table,
            &[RegionRequest::new("rom", 0x8000), RegionRequest::new("sram", 0x1000)],
        )
        .unwrap();
        assert_eq!(m.region("sram").unwrap().base_address, 0x1000_0000);

        let err = m
            .register_requests(&table, &[RegionRequest::new("ethmac", 0x2000)])
            .unwrap_err();
        assert!(matches!(err, ResourceError::MissingRegionBase { .. }));
    }
}

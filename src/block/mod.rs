//! Block identifiers and the immutable block catalog (C1).

mod catalog;

pub use catalog::{BlockDefinition, MaterialClass, BLOCK_CATALOG};

use std::fmt;

/// Unique identifier for a block type. 256 variants is sufficient per the
/// data model, but a `u16` keeps room for mod-space growth the way the
/// teacher's `BlockId` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct BlockId(pub u8);

unsafe impl bytemuck::Pod for BlockId {}
unsafe impl bytemuck::Zeroable for BlockId {}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BLOCK_CATALOG.get(*self).name)
    }
}

impl BlockId {
    pub const AIR: BlockId = BlockId(0);
    pub const STONE: BlockId = BlockId(1);
    pub const DIRT: BlockId = BlockId(2);
    pub const GRASS: BlockId = BlockId(3);
    pub const BEDROCK: BlockId = BlockId(4);
    pub const SAND: BlockId = BlockId(5);
    pub const GRAVEL: BlockId = BlockId(6);
    pub const SANDSTONE: BlockId = BlockId(7);
    pub const WATER: BlockId = BlockId(8);
    pub const GLASS: BlockId = BlockId(9);
    pub const LEAVES: BlockId = BlockId(10);
    pub const LOG: BlockId = BlockId(11);
    pub const COAL_ORE: BlockId = BlockId(12);
    pub const IRON_ORE: BlockId = BlockId(13);
    pub const GOLD_ORE: BlockId = BlockId(14);
    pub const DIAMOND_ORE: BlockId = BlockId(15);
    pub const TALL_GRASS: BlockId = BlockId(16);
    pub const FLOWER_RED: BlockId = BlockId(17);
    pub const FLOWER_YELLOW: BlockId = BlockId(18);
    pub const DEAD_BUSH: BlockId = BlockId(19);
    pub const CACTUS: BlockId = BlockId(20);
    pub const SNOW: BlockId = BlockId(21);
    pub const ICE: BlockId = BlockId(22);
    pub const CLAY: BlockId = BlockId(23);
    pub const GLOWSTONE: BlockId = BlockId(24);
    pub const MUD: BlockId = BlockId(25);
    /// Sentinel used by the catalog's fallback entry; never produced by
    /// generation, only returned for ids outside the registered range.
    pub const UNKNOWN: BlockId = BlockId(255);
}

impl BlockDefinition {
    pub fn is_air(&self, id: BlockId) -> bool {
        id == BlockId::AIR
    }
}

/// Whether `id` occludes light and hides the faces of opaque neighbors.
pub fn is_opaque(id: BlockId) -> bool {
    BLOCK_CATALOG.get(id).opaque
}

/// Whether `id` is rendered even when its neighbor is the same material
/// class (glass-on-glass, leaves-on-leaves).
pub fn is_transparent(id: BlockId) -> bool {
    BLOCK_CATALOG.get(id).transparent
}

pub fn material_class(id: BlockId) -> MaterialClass {
    BLOCK_CATALOG.get(id).material
}

pub fn is_fluid(id: BlockId) -> bool {
    material_class(id) == MaterialClass::Fluid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_transparent_and_non_opaque() {
        assert!(!is_opaque(BlockId::AIR));
    }

    #[test]
    fn unknown_ids_fall_back_to_visible_entry() {
        let def = BLOCK_CATALOG.get(BlockId(200));
        assert_eq!(def.name, "Unknown");
        assert_eq!(def.default_color, [1.0, 0.0, 1.0]);
    }
}

//! The immutable block catalog (C1). Lookup by id is O(1): a plain array
//! index, built once as a `const` table. Unknown ids resolve to a visible
//! magenta fallback rather than an error, per the spec.

use super::BlockId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialClass {
    Solid,
    Fluid,
    Cross,
    Leaves,
    Bedrock,
}

#[derive(Debug, Clone, Copy)]
pub struct BlockDefinition {
    pub name: &'static str,
    pub texture_top: &'static str,
    pub texture_bottom: &'static str,
    pub texture_side: &'static str,
    pub default_color: [f32; 3],
    /// Blocks light propagation.
    pub opaque: bool,
    /// Neighbor faces of opaque blocks remain rendered when this block is
    /// the neighbor (glass, leaves).
    pub transparent: bool,
    /// Per-channel emission, 0..15.
    pub emission: (u8, u8, u8),
    pub material: MaterialClass,
}

const UNKNOWN: BlockDefinition = BlockDefinition {
    name: "Unknown",
    texture_top: "unknown",
    texture_bottom: "unknown",
    texture_side: "unknown",
    default_color: [1.0, 0.0, 1.0],
    opaque: true,
    transparent: false,
    emission: (0, 0, 0),
    material: MaterialClass::Solid,
};

pub struct BlockCatalog {
    entries: [BlockDefinition; 256],
}

impl BlockCatalog {
    pub fn get(&self, id: BlockId) -> &BlockDefinition {
        &self.entries[id.0 as usize]
    }

    const fn new() -> Self {
        let mut entries = [UNKNOWN; 256];

        entries[BlockId::AIR.0 as usize] = BlockDefinition {
            name: "Air",
            texture_top: "air",
            texture_bottom: "air",
            texture_side: "air",
            default_color: [0.0, 0.0, 0.0],
            opaque: false,
            transparent: true,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::STONE.0 as usize] = BlockDefinition {
            name: "Stone",
            texture_top: "stone",
            texture_bottom: "stone",
            texture_side: "stone",
            default_color: [0.5, 0.5, 0.5],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::DIRT.0 as usize] = BlockDefinition {
            name: "Dirt",
            texture_top: "dirt",
            texture_bottom: "dirt",
            texture_side: "dirt",
            default_color: [0.45, 0.3, 0.18],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::GRASS.0 as usize] = BlockDefinition {
            name: "Grass",
            texture_top: "grass_top",
            texture_bottom: "dirt",
            texture_side: "grass_side",
            default_color: [0.38, 0.62, 0.26],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::BEDROCK.0 as usize] = BlockDefinition {
            name: "Bedrock",
            texture_top: "bedrock",
            texture_bottom: "bedrock",
            texture_side: "bedrock",
            default_color: [0.1, 0.1, 0.1],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Bedrock,
        };

        entries[BlockId::SAND.0 as usize] = BlockDefinition {
            name: "Sand",
            texture_top: "sand",
            texture_bottom: "sand",
            texture_side: "sand",
            default_color: [0.86, 0.79, 0.55],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::GRAVEL.0 as usize] = BlockDefinition {
            name: "Gravel",
            texture_top: "gravel",
            texture_bottom: "gravel",
            texture_side: "gravel",
            default_color: [0.55, 0.53, 0.5],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::SANDSTONE.0 as usize] = BlockDefinition {
            name: "Sandstone",
            texture_top: "sandstone_top",
            texture_bottom: "sandstone_bottom",
            texture_side: "sandstone_side",
            default_color: [0.8, 0.75, 0.55],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::WATER.0 as usize] = BlockDefinition {
            name: "Water",
            texture_top: "water",
            texture_bottom: "water",
            texture_side: "water",
            default_color: [0.15, 0.35, 0.75],
            opaque: false,
            transparent: true,
            emission: (0, 0, 0),
            material: MaterialClass::Fluid,
        };

        entries[BlockId::GLASS.0 as usize] = BlockDefinition {
            name: "Glass",
            texture_top: "glass",
            texture_bottom: "glass",
            texture_side: "glass",
            default_color: [0.9, 0.95, 1.0],
            opaque: false,
            transparent: true,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::LEAVES.0 as usize] = BlockDefinition {
            name: "Leaves",
            texture_top: "leaves",
            texture_bottom: "leaves",
            texture_side: "leaves",
            default_color: [0.25, 0.5, 0.15],
            opaque: false,
            transparent: true,
            emission: (0, 0, 0),
            material: MaterialClass::Leaves,
        };

        entries[BlockId::LOG.0 as usize] = BlockDefinition {
            name: "Log",
            texture_top: "log_top",
            texture_bottom: "log_top",
            texture_side: "log_side",
            default_color: [0.4, 0.28, 0.15],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::COAL_ORE.0 as usize] = BlockDefinition {
            name: "Coal Ore",
            texture_top: "coal_ore",
            texture_bottom: "coal_ore",
            texture_side: "coal_ore",
            default_color: [0.3, 0.3, 0.3],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::IRON_ORE.0 as usize] = BlockDefinition {
            name: "Iron Ore",
            texture_top: "iron_ore",
            texture_bottom: "iron_ore",
            texture_side: "iron_ore",
            default_color: [0.75, 0.65, 0.55],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::GOLD_ORE.0 as usize] = BlockDefinition {
            name: "Gold Ore",
            texture_top: "gold_ore",
            texture_bottom: "gold_ore",
            texture_side: "gold_ore",
            default_color: [0.85, 0.75, 0.3],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::DIAMOND_ORE.0 as usize] = BlockDefinition {
            name: "Diamond Ore",
            texture_top: "diamond_ore",
            texture_bottom: "diamond_ore",
            texture_side: "diamond_ore",
            default_color: [0.6, 0.9, 0.9],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::TALL_GRASS.0 as usize] = BlockDefinition {
            name: "Tall Grass",
            texture_top: "tall_grass",
            texture_bottom: "tall_grass",
            texture_side: "tall_grass",
            default_color: [0.4, 0.65, 0.25],
            opaque: false,
            transparent: true,
            emission: (0, 0, 0),
            material: MaterialClass::Cross,
        };

        entries[BlockId::FLOWER_RED.0 as usize] = BlockDefinition {
            name: "Red Flower",
            texture_top: "flower_red",
            texture_bottom: "flower_red",
            texture_side: "flower_red",
            default_color: [0.8, 0.1, 0.1],
            opaque: false,
            transparent: true,
            emission: (0, 0, 0),
            material: MaterialClass::Cross,
        };

        entries[BlockId::FLOWER_YELLOW.0 as usize] = BlockDefinition {
            name: "Yellow Flower",
            texture_top: "flower_yellow",
            texture_bottom: "flower_yellow",
            texture_side: "flower_yellow",
            default_color: [0.85, 0.75, 0.1],
            opaque: false,
            transparent: true,
            emission: (0, 0, 0),
            material: MaterialClass::Cross,
        };

        entries[BlockId::DEAD_BUSH.0 as usize] = BlockDefinition {
            name: "Dead Bush",
            texture_top: "dead_bush",
            texture_bottom: "dead_bush",
            texture_side: "dead_bush",
            default_color: [0.55, 0.45, 0.25],
            opaque: false,
            transparent: true,
            emission: (0, 0, 0),
            material: MaterialClass::Cross,
        };

        entries[BlockId::CACTUS.0 as usize] = BlockDefinition {
            name: "Cactus",
            texture_top: "cactus_top",
            texture_bottom: "cactus_bottom",
            texture_side: "cactus_side",
            default_color: [0.2, 0.55, 0.2],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::SNOW.0 as usize] = BlockDefinition {
            name: "Snow",
            texture_top: "snow",
            texture_bottom: "snow",
            texture_side: "snow",
            default_color: [0.95, 0.95, 0.97],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::ICE.0 as usize] = BlockDefinition {
            name: "Ice",
            texture_top: "ice",
            texture_bottom: "ice",
            texture_side: "ice",
            default_color: [0.7, 0.85, 0.95],
            opaque: false,
            transparent: true,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::CLAY.0 as usize] = BlockDefinition {
            name: "Clay",
            texture_top: "clay",
            texture_bottom: "clay",
            texture_side: "clay",
            default_color: [0.6, 0.62, 0.65],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        entries[BlockId::GLOWSTONE.0 as usize] = BlockDefinition {
            name: "Glowstone",
            texture_top: "glowstone",
            texture_bottom: "glowstone",
            texture_side: "glowstone",
            default_color: [0.95, 0.85, 0.5],
            opaque: true,
            transparent: false,
            emission: (15, 15, 15),
            material: MaterialClass::Solid,
        };

        entries[BlockId::MUD.0 as usize] = BlockDefinition {
            name: "Mud",
            texture_top: "mud",
            texture_bottom: "mud",
            texture_side: "mud",
            default_color: [0.3, 0.25, 0.18],
            opaque: true,
            transparent: false,
            emission: (0, 0, 0),
            material: MaterialClass::Solid,
        };

        BlockCatalog { entries }
    }
}

pub static BLOCK_CATALOG: BlockCatalog = BlockCatalog::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_definition_is_transparent_non_opaque() {
        let def = BLOCK_CATALOG.get(BlockId::AIR);
        assert!(!def.opaque);
        assert!(def.transparent);
    }

    #[test]
    fn glowstone_emits_full_white_light() {
        assert_eq!(BLOCK_CATALOG.get(BlockId::GLOWSTONE).emission, (15, 15, 15));
    }

    #[test]
    fn bedrock_is_its_own_material_class() {
        assert_eq!(
            BLOCK_CATALOG.get(BlockId::BEDROCK).material,
            MaterialClass::Bedrock
        );
    }
}

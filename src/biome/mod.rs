//! Biome catalog and selection (C4).

mod source;

pub use source::{BiomeQuery, BiomeSelection, BiomeSource, TransitionBand};

use crate::block::BlockId;

/// Compact biome identifier, catalog-indexed like [`crate::block::BlockId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BiomeId(pub u8);

impl BiomeId {
    pub const OCEAN: BiomeId = BiomeId(0);
    pub const PLAINS: BiomeId = BiomeId(1);
    pub const DESERT: BiomeId = BiomeId(2);
    pub const JUNGLE: BiomeId = BiomeId(3);
    pub const TAIGA: BiomeId = BiomeId(4);
    pub const SWAMP: BiomeId = BiomeId(5);
    pub const MOUNTAINS: BiomeId = BiomeId(6);
    pub const LOWLAND: BiomeId = BiomeId(7);
    pub const RIVER: BiomeId = BiomeId(8);
    pub const DRY_PLAINS: BiomeId = BiomeId(9);
    pub const SAVANNA: BiomeId = BiomeId(10);
    pub const MARSH: BiomeId = BiomeId(11);
    pub const FOOTHILLS: BiomeId = BiomeId(12);

    pub fn def(self) -> &'static BiomeDefinition {
        BIOME_TABLE
            .iter()
            .find(|d| d.id == self)
            .unwrap_or(&BIOME_TABLE[1])
    }
}

/// Coarse family used only to look up the transition table; several
/// [`BiomeId`]s (e.g. the transition biomes themselves) have no family and
/// never participate in a further transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiomeFamily {
    Desert,
    Temperate,
    Jungle,
    Cold,
    Swamp,
    Mountains,
    Lowland,
    None,
}

pub fn family(id: BiomeId) -> BiomeFamily {
    match id {
        BiomeId::DESERT => BiomeFamily::Desert,
        BiomeId::PLAINS => BiomeFamily::Temperate,
        BiomeId::JUNGLE => BiomeFamily::Jungle,
        BiomeId::TAIGA => BiomeFamily::Cold,
        BiomeId::SWAMP => BiomeFamily::Swamp,
        BiomeId::MOUNTAINS => BiomeFamily::Mountains,
        BiomeId::LOWLAND => BiomeFamily::Lowland,
        _ => BiomeFamily::None,
    }
}

/// A single tree/feature schematic reference consulted by the decorator.
#[derive(Debug, Clone, Copy)]
pub struct TreeProfile {
    pub kind: &'static str,
    pub weight: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct VegetationProfile {
    pub simple_decorations: &'static [BlockId],
    pub trees: &'static [TreeProfile],
    pub veg_multiplier: f32,
}

/// Climate-point + terrain-rule definition consumed by the Voronoi
/// selection in [`BiomeSource`], plus the terrain-filling and decoration
/// data the rest of generation needs once a biome id is known.
#[derive(Debug, Clone, Copy)]
pub struct BiomeDefinition {
    pub id: BiomeId,
    pub name: &'static str,
    pub heat: f32,
    pub humidity: f32,
    pub weight: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub min_continental: f32,
    pub max_continental: f32,
    pub max_slope: f32,
    pub surface_block: BlockId,
    pub filler_block: BlockId,
    pub vegetation: VegetationProfile,
}

const NO_VEGETATION: VegetationProfile = VegetationProfile {
    simple_decorations: &[],
    trees: &[],
    veg_multiplier: 0.0,
};

const PLAINS_VEGETATION: VegetationProfile = VegetationProfile {
    simple_decorations: &[BlockId::TALL_GRASS, BlockId::FLOWER_RED, BlockId::FLOWER_YELLOW],
    trees: &[TreeProfile { kind: "oak", weight: 0.02 }],
    veg_multiplier: 1.0,
};

const DESERT_VEGETATION: VegetationProfile = VegetationProfile {
    simple_decorations: &[BlockId::DEAD_BUSH],
    trees: &[TreeProfile { kind: "cactus", weight: 0.01 }],
    veg_multiplier: 0.2,
};

const JUNGLE_VEGETATION: VegetationProfile = VegetationProfile {
    simple_decorations: &[BlockId::TALL_GRASS],
    trees: &[TreeProfile { kind: "jungle_tree", weight: 0.12 }],
    veg_multiplier: 2.5,
};

const TAIGA_VEGETATION: VegetationProfile = VegetationProfile {
    simple_decorations: &[],
    trees: &[TreeProfile { kind: "spruce", weight: 0.08 }],
    veg_multiplier: 0.8,
};

/// Declaration order matters: Voronoi ties are broken by the first match in
/// this array.
pub static BIOME_TABLE: [BiomeDefinition; 13] = [
    BiomeDefinition {
        id: BiomeId::OCEAN,
        name: "Ocean",
        heat: 0.5,
        humidity: 0.5,
        weight: 1.0,
        y_min: -64.0,
        y_max: 64.0,
        min_continental: 0.0,
        max_continental: 0.35,
        max_slope: 1.0,
        surface_block: BlockId::SAND,
        filler_block: BlockId::SAND,
        vegetation: NO_VEGETATION,
    },
    BiomeDefinition {
        id: BiomeId::PLAINS,
        name: "Plains",
        heat: 0.55,
        humidity: 0.45,
        weight: 1.0,
        y_min: 60.0,
        y_max: 100.0,
        min_continental: 0.45,
        max_continental: 1.0,
        max_slope: 0.5,
        surface_block: BlockId::GRASS,
        filler_block: BlockId::DIRT,
        vegetation: PLAINS_VEGETATION,
    },
    BiomeDefinition {
        id: BiomeId::DESERT,
        name: "Desert",
        heat: 0.9,
        humidity: 0.1,
        weight: 1.0,
        y_min: 60.0,
        y_max: 110.0,
        min_continental: 0.45,
        max_continental: 1.0,
        max_slope: 0.6,
        surface_block: BlockId::SAND,
        filler_block: BlockId::SAND,
        vegetation: DESERT_VEGETATION,
    },
    BiomeDefinition {
        id: BiomeId::JUNGLE,
        name: "Jungle",
        heat: 0.85,
        humidity: 0.9,
        weight: 1.0,
        y_min: 60.0,
        y_max: 110.0,
        min_continental: 0.45,
        max_continental: 1.0,
        max_slope: 0.7,
        surface_block: BlockId::GRASS,
        filler_block: BlockId::DIRT,
        vegetation: JUNGLE_VEGETATION,
    },
    BiomeDefinition {
        id: BiomeId::TAIGA,
        name: "Taiga",
        heat: 0.15,
        humidity: 0.4,
        weight: 1.0,
        y_min: 60.0,
        y_max: 120.0,
        min_continental: 0.45,
        max_continental: 1.0,
        max_slope: 0.8,
        surface_block: BlockId::SNOW,
        filler_block: BlockId::DIRT,
        vegetation: TAIGA_VEGETATION,
    },
    BiomeDefinition {
        id: BiomeId::SWAMP,
        name: "Swamp",
        heat: 0.6,
        humidity: 0.8,
        weight: 0.8,
        y_min: 60.0,
        y_max: 68.0,
        min_continental: 0.35,
        max_continental: 0.55,
        max_slope: 0.25,
        surface_block: BlockId::MUD,
        filler_block: BlockId::MUD,
        vegetation: NO_VEGETATION,
    },
    BiomeDefinition {
        id: BiomeId::MOUNTAINS,
        name: "Mountains",
        heat: 0.3,
        humidity: 0.4,
        weight: 1.0,
        y_min: 110.0,
        y_max: 256.0,
        min_continental: 0.6,
        max_continental: 1.0,
        max_slope: 1.0,
        surface_block: BlockId::STONE,
        filler_block: BlockId::STONE,
        vegetation: NO_VEGETATION,
    },
    BiomeDefinition {
        id: BiomeId::LOWLAND,
        name: "Lowland",
        heat: 0.5,
        humidity: 0.5,
        weight: 1.0,
        y_min: 60.0,
        y_max: 80.0,
        min_continental: 0.35,
        max_continental: 0.6,
        max_slope: 0.3,
        surface_block: BlockId::GRASS,
        filler_block: BlockId::DIRT,
        vegetation: PLAINS_VEGETATION,
    },
    BiomeDefinition {
        id: BiomeId::RIVER,
        name: "River",
        heat: 0.5,
        humidity: 0.5,
        weight: 1.0,
        y_min: 0.0,
        y_max: 120.0,
        min_continental: 0.0,
        max_continental: 1.0,
        max_slope: 1.0,
        surface_block: BlockId::SAND,
        filler_block: BlockId::SAND,
        vegetation: NO_VEGETATION,
    },
    BiomeDefinition {
        id: BiomeId::DRY_PLAINS,
        name: "Dry Plains",
        heat: 0.7,
        humidity: 0.25,
        weight: 1.0,
        y_min: 60.0,
        y_max: 100.0,
        min_continental: 0.45,
        max_continental: 1.0,
        max_slope: 0.5,
        surface_block: BlockId::GRASS,
        filler_block: BlockId::DIRT,
        vegetation: DESERT_VEGETATION,
    },
    BiomeDefinition {
        id: BiomeId::SAVANNA,
        name: "Savanna",
        heat: 0.85,
        humidity: 0.45,
        weight: 1.0,
        y_min: 60.0,
        y_max: 100.0,
        min_continental: 0.45,
        max_continental: 1.0,
        max_slope: 0.5,
        surface_block: BlockId::GRASS,
        filler_block: BlockId::DIRT,
        vegetation: DESERT_VEGETATION,
    },
    BiomeDefinition {
        id: BiomeId::MARSH,
        name: "Marsh",
        heat: 0.55,
        humidity: 0.6,
        weight: 0.8,
        y_min: 60.0,
        y_max: 68.0,
        min_continental: 0.35,
        max_continental: 0.55,
        max_slope: 0.25,
        surface_block: BlockId::MUD,
        filler_block: BlockId::MUD,
        vegetation: NO_VEGETATION,
    },
    BiomeDefinition {
        id: BiomeId::FOOTHILLS,
        name: "Foothills",
        heat: 0.4,
        humidity: 0.45,
        weight: 1.0,
        y_min: 90.0,
        y_max: 130.0,
        min_continental: 0.55,
        max_continental: 1.0,
        max_slope: 0.9,
        surface_block: BlockId::STONE,
        filler_block: BlockId::STONE,
        vegetation: NO_VEGETATION,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_consistent_with_declared_id() {
        assert_eq!(BiomeId::DESERT.def().id, BiomeId::DESERT);
    }

    #[test]
    fn unknown_id_falls_back_to_plains() {
        assert_eq!(BiomeId(200).def().name, "Plains");
    }
}

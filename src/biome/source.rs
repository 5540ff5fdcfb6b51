//! Voronoi-over-climate biome selection plus edge detection and transition
//! blending (C4).

use super::{family, BiomeDefinition, BiomeFamily, BiomeId, BIOME_TABLE};

/// Climate/structural parameters for a single query column.
#[derive(Debug, Clone, Copy)]
pub struct BiomeQuery {
    pub heat: f32,
    pub humidity: f32,
    pub height: f32,
    pub continentalness: f32,
    pub slope: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionBand {
    Inner,
    Middle,
    Outer,
}

impl TransitionBand {
    pub fn blend_factor(self) -> f32 {
        match self {
            TransitionBand::Inner => 0.3,
            TransitionBand::Middle => 0.2,
            TransitionBand::Outer => 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BiomeSelection {
    /// The biome id to store in the chunk's per-column array: the
    /// transition biome when one was detected, otherwise `primary`.
    pub biome: BiomeId,
    pub primary: BiomeId,
    pub secondary: Option<BiomeId>,
    pub band: Option<TransitionBand>,
}

impl BiomeSelection {
    pub fn blend_factor(&self) -> f32 {
        self.band.map(TransitionBand::blend_factor).unwrap_or(0.0)
    }
}

const EDGE_OFFSETS: [i32; 3] = [4, 8, 12];

fn band_for_offset(offset: i32) -> TransitionBand {
    match offset {
        4 => TransitionBand::Inner,
        8 => TransitionBand::Middle,
        _ => TransitionBand::Outer,
    }
}

fn transition_for(a: BiomeFamily, b: BiomeFamily) -> Option<BiomeId> {
    use BiomeFamily::*;
    let pair = (a, b);
    let result = match pair {
        (Desert, Temperate) | (Temperate, Desert) => BiomeId::DRY_PLAINS,
        (Desert, Jungle) | (Jungle, Desert) => BiomeId::SAVANNA,
        (Cold, Temperate) | (Temperate, Cold) => BiomeId::TAIGA,
        (Swamp, Desert) | (Desert, Swamp) => BiomeId::MARSH,
        (Mountains, Lowland) | (Lowland, Mountains) => BiomeId::FOOTHILLS,
        _ => return Option::None,
    };
    Some(result)
}

pub struct BiomeSource;

impl BiomeSource {
    pub fn new() -> Self {
        BiomeSource
    }

    /// Stage 1 (Voronoi) + stage 2 (river override), no edge detection.
    pub fn classify(&self, query: BiomeQuery, river_mask: f32) -> BiomeId {
        if river_mask > 0.5 && query.height < 120.0 {
            return BiomeId::RIVER;
        }
        self.nearest_point(query).id
    }

    fn nearest_point(&self, query: BiomeQuery) -> &'static BiomeDefinition {
        let mut best: Option<(&'static BiomeDefinition, f32)> = None;
        for def in BIOME_TABLE.iter() {
            if query.height < def.y_min || query.height > def.y_max {
                continue;
            }
            if query.continentalness < def.min_continental
                || query.continentalness > def.max_continental
            {
                continue;
            }
            if query.slope > def.max_slope {
                continue;
            }
            let dh = query.heat - def.heat;
            let dm = query.humidity - def.humidity;
            let dist = (dh * dh + dm * dm).sqrt() / def.weight;
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((def, dist)),
            }
        }
        best.map(|(def, _)| def).unwrap_or(&BIOME_TABLE[1])
    }

    /// Full selection including edge detection against up to 12 neighbor
    /// samples, obtained from `sample_at` (world-space offsets on X and Z).
    pub fn resolve(
        &self,
        world_x: i32,
        world_z: i32,
        center: BiomeQuery,
        river_mask: f32,
        sample_at: impl Fn(i32, i32) -> (BiomeQuery, f32),
    ) -> BiomeSelection {
        let primary = self.classify(center, river_mask);
        if primary == BiomeId::RIVER {
            return BiomeSelection {
                biome: BiomeId::RIVER,
                primary: BiomeId::RIVER,
                secondary: None,
                band: None,
            };
        }

        for &offset in EDGE_OFFSETS.iter() {
            for (dx, dz) in [(offset, 0), (-offset, 0), (0, offset), (0, -offset)] {
                let (neighbor_query, neighbor_river) = sample_at(world_x + dx, world_z + dz);
                let neighbor = self.classify(neighbor_query, neighbor_river);
                if neighbor == primary {
                    continue;
                }
                if let Some(transition) = transition_for(family(primary), family(neighbor)) {
                    return BiomeSelection {
                        biome: transition,
                        primary,
                        secondary: Some(neighbor),
                        band: Some(band_for_offset(offset)),
                    };
                }
            }
        }

        BiomeSelection {
            biome: primary,
            primary,
            secondary: None,
            band: None,
        }
    }
}

impl Default for BiomeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plains_query() -> BiomeQuery {
        BiomeQuery {
            heat: 0.55,
            humidity: 0.45,
            height: 70.0,
            continentalness: 0.6,
            slope: 0.1,
        }
    }

    #[test]
    fn classify_picks_nearest_climate_point() {
        let source = BiomeSource::new();
        assert_eq!(source.classify(plains_query(), 0.0), BiomeId::PLAINS);
    }

    #[test]
    fn river_mask_overrides_voronoi_below_120() {
        let source = BiomeSource::new();
        assert_eq!(source.classify(plains_query(), 0.9), BiomeId::RIVER);
    }

    #[test]
    fn high_river_mask_above_120_does_not_override() {
        let source = BiomeSource::new();
        let query = BiomeQuery {
            height: 150.0,
            ..plains_query()
        };
        assert_ne!(source.classify(query, 0.9), BiomeId::RIVER);
    }

    #[test]
    fn desert_next_to_plains_yields_dry_plains_transition() {
        let source = BiomeSource::new();
        let center = BiomeQuery {
            heat: 0.9,
            humidity: 0.1,
            height: 70.0,
            continentalness: 0.6,
            slope: 0.1,
        };
        let selection = source.resolve(0, 0, center, 0.0, |_, _| (plains_query(), 0.0));
        assert_eq!(selection.biome, BiomeId::DRY_PLAINS);
        assert_eq!(selection.primary, BiomeId::DESERT);
        assert_eq!(selection.secondary, Some(BiomeId::PLAINS));
        assert_eq!(selection.band, Some(TransitionBand::Inner));
    }

    #[test]
    fn uniform_neighborhood_has_no_transition() {
        let source = BiomeSource::new();
        let selection = source.resolve(0, 0, plains_query(), 0.0, |_, _| (plains_query(), 0.0));
        assert_eq!(selection.biome, BiomeId::PLAINS);
        assert!(selection.band.is_none());
    }
}

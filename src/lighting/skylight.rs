//! Skylight pass (C8): a top-down sweep per column, independent of every
//! other column.

use crate::block::{is_fluid, is_opaque};
use crate::chunk::{Chunk, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z, MAX_LIGHT};

pub struct SkylightPass;

impl SkylightPass {
    pub fn run(chunk: &mut Chunk) {
        for lz in 0..CHUNK_SIZE_Z {
            for lx in 0..CHUNK_SIZE_X {
                Self::sweep_column(chunk, lx, lz);
            }
        }
    }

    fn sweep_column(chunk: &mut Chunk, lx: i32, lz: i32) {
        let mut sky_light = MAX_LIGHT;
        for ly in (0..CHUNK_SIZE_Y).rev() {
            let existing = chunk.light_local(lx, ly, lz);
            chunk.set_light_local(lx, ly, lz, existing.with_sky(sky_light));

            let block = chunk.block_local(lx, ly, lz);
            if is_opaque(block) {
                sky_light = 0;
            } else if is_fluid(block) && sky_light > 0 {
                sky_light -= 1;
            }
        }
    }
}

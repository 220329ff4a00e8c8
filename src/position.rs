/// Packs region coordinates into the 64-bit index key.
///
/// Z occupies the low 32 bits and is masked, so a negative z cannot
/// leak sign bits into x.
pub(crate) fn region_key(region_x: i32, region_z: i32) -> u64 {
    ((region_x as u32 as u64) << 32) | (region_z as u32 as u64)
}

/// Full decomposition of a global block coordinate into the
/// region / chunk / section / local address used by lookups.
///
/// All divisions truncate toward zero, matching the region file
/// addressing for the coordinates it was written with.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct BlockRoute {
    pub region_x: i32,
    pub region_z: i32,
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub section_y: i32,
    pub local_x: i32,
    pub local_y: i32,
    pub local_z: i32,
}

impl BlockRoute {
    pub fn from_global(x: i32, y: i32, z: i32) -> BlockRoute {
        // Block y = -15 belongs to section Y = -1, but -15 / 16 = 0.
        // Shifting by the world floor keeps the working range
        // non-negative; the section index is rebased by -4 afterwards.
        let y = y + 64;

        let region_x = x / 512;
        let region_z = z / 512;

        let in_region_x = x % 512;
        let in_region_z = z % 512;

        BlockRoute {
            region_x,
            region_z,
            chunk_x: in_region_x / 16,
            chunk_z: in_region_z / 16,
            section_y: y / 16 - 4,
            local_x: in_region_x % 16,
            local_y: y % 16,
            local_z: in_region_z % 16,
        }
    }

    /// Reconstructs the global coordinate this route was derived from.
    pub fn global(&self) -> (i32, i32, i32) {
        let x = self.region_x * 512 + self.chunk_x * 16 + self.local_x;
        let y = (self.section_y + 4) * 16 + self.local_y - 64;
        let z = self.region_z * 512 + self.chunk_z * 16 + self.local_z;

        (x, y, z)
    }
}

#[cfg(test)]
mod tests {
    use crate::position::{region_key, BlockRoute};

    #[test]
    fn test_route_positive() {
        let route = BlockRoute::from_global(1000, 70, 200);

        assert_eq!(route.region_x, 1);
        assert_eq!(route.region_z, 0);
        assert_eq!(route.chunk_x, 30);
        assert_eq!(route.chunk_z, 12);
        assert_eq!(route.section_y, 4);
        assert_eq!(route.local_x, 8);
        assert_eq!(route.local_y, 6);
        assert_eq!(route.local_z, 8);
    }

    #[test]
    fn test_route_world_floor() {
        let route = BlockRoute::from_global(0, -64, 0);

        assert_eq!(route.section_y, -4);
        assert_eq!(route.local_y, 0);

        let route = BlockRoute::from_global(0, -15, 0);

        assert_eq!(route.section_y, -1);
        assert_eq!(route.local_y, 1);
    }

    #[test]
    fn test_route_round_trip() {
        let samples = [
            (0, -64, 0),
            (511, 319, 511),
            (512, 0, 1024),
            (-1, 0, -1),
            (-513, -33, -512),
            (1000, 70, -200),
            (-1000, 255, 999),
        ];

        for &(x, y, z) in &samples {
            let route = BlockRoute::from_global(x, y, z);

            assert_eq!(route.global(), (x, y, z), "route {:?}", route);
        }
    }

    #[test]
    fn test_region_key_negative_z() {
        assert_ne!(region_key(0, -1), region_key(-1, -1));
        assert_ne!(region_key(1, -1), region_key(0, -1));
        assert_eq!(region_key(-1, 2), region_key(-1, 2));
        assert_eq!(region_key(1, 2), (1 << 32) | 2);
    }
}

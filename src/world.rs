use crate::error::WorldError;
use crate::pool::ThreadPool;
use crate::position::{region_key, BlockRoute};
use crate::region::Region;
use crate::section::BlockName;
use log::debug;
use std::collections::HashMap;
use std::fs::read_dir;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// A whole save directory: every region file found on disk, indexed by
/// region coordinate.
///
/// Regions are discovered once at construction and never re-discovered.
/// Block queries route a global coordinate down through region, chunk
/// and section and return an owned block name.
pub struct World {
    /// Folder where region files located.
    region_folder: PathBuf,
    regions: HashMap<u64, Region>,
}

impl World {
    /// Scans `<path>/region` and indexes every `r.<x>.<z>.mca` file.
    ///
    /// Entries with other names are skipped. The pool is shared by all
    /// regions of this world for their decode fan-out.
    pub fn open<P: AsRef<Path>>(path: P, pool: Arc<ThreadPool>) -> Result<World, WorldError> {
        let region_folder = path.as_ref().join("region");
        let mut regions = HashMap::new();

        for entry in read_dir(&region_folder)? {
            let path = entry?.path();

            let (x, z) = match region_coordinates(&path) {
                Some(coordinates) => coordinates,
                None => continue,
            };

            debug!(target: "anvil-world", "Discovered region x: {}, z: {}", x, z);
            regions.insert(region_key(x, z), Region::new(x, z, path, pool.clone()));
        }

        Ok(World {
            region_folder,
            regions,
        })
    }

    pub fn region_folder(&self) -> &Path {
        &self.region_folder
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Returns the region at specified region coordinates.
    pub fn get_region(&mut self, region_x: i32, region_z: i32) -> Result<&mut Region, WorldError> {
        self.regions
            .get_mut(&region_key(region_x, region_z))
            .ok_or(WorldError::RegionNotFound { region_x, region_z })
    }

    /// Resolves the block identity at a global block coordinate.
    ///
    /// Builds the owning region's cache on first access. Querying a
    /// chunk slot which held no data is an `UninitializedBlock` error.
    ///
    /// Coordinate arithmetic truncates toward zero, so an x or z in
    /// the negative half of a region yields a negative in-region
    /// offset and the lookup panics on the coordinate precondition
    /// instead of returning an error.
    pub fn get_block(&mut self, x: i32, y: i32, z: i32) -> Result<BlockName, WorldError> {
        let route = BlockRoute::from_global(x, y, z);

        let region = self.get_region(route.region_x, route.region_z)?;

        let chunk = region
            .fetch_chunk(route.chunk_x, route.chunk_z)
            .map_err(|source| WorldError::Region {
                region_x: route.region_x,
                region_z: route.region_z,
                source,
            })?;

        if chunk.is_empty() {
            return Err(WorldError::UninitializedBlock { x, y, z });
        }

        let section = chunk.section(route.section_y);

        Ok(section.block_at(route.local_x, route.local_y, route.local_z))
    }

    /// Visits every block of every region, one region at a time.
    ///
    /// Each region's cache is built before its blocks are visited and
    /// cleared right after, so memory stays bounded by one region.
    /// Uniform sections and blocks named in `skip_blocks` are skipped.
    pub fn for_each_block<F>(&mut self, skip_blocks: &[&str], mut visit: F) -> Result<(), WorldError>
    where
        F: FnMut(i32, i32, i32, &BlockName),
    {
        for region in self.regions.values_mut() {
            let region_x = region.x();
            let region_z = region.z();

            region.build_cache().map_err(|source| WorldError::Region {
                region_x,
                region_z,
                source,
            })?;

            for chunk_x in 0..32 {
                for chunk_z in 0..32 {
                    let chunk = match region.fetch_chunk(chunk_x, chunk_z) {
                        Ok(chunk) => chunk,
                        Err(source) => {
                            return Err(WorldError::Region {
                                region_x,
                                region_z,
                                source,
                            })
                        }
                    };

                    if chunk.is_empty() {
                        continue;
                    }

                    for section_y in -4..20 {
                        let section = chunk.section(section_y);

                        if section.is_uniform() {
                            continue;
                        }

                        for local_x in 0..16 {
                            for local_y in 0..16 {
                                for local_z in 0..16 {
                                    let name = section.block_at(local_x, local_y, local_z);

                                    if skip_blocks.iter().any(|skip| *skip == &*name) {
                                        continue;
                                    }

                                    let x = region_x * 512 + chunk_x * 16 + local_x;
                                    let y = section_y * 16 + local_y;
                                    let z = region_z * 512 + chunk_z * 16 + local_z;

                                    visit(x, y, z, &name);
                                }
                            }
                        }
                    }
                }
            }

            region.clear_cache();
        }

        Ok(())
    }
}

/// Extracts region coordinates from a `r.<x>.<z>.mca` file name.
///
/// Any other name yields `None` and the file is ignored.
fn region_coordinates(path: &Path) -> Option<(i32, i32)> {
    let file_name = path.file_name()?.to_str()?;
    let parts: Vec<&str> = file_name.split('.').collect();

    if parts.len() != 4 || parts[0] != "r" || parts[3] != "mca" {
        return None;
    }

    let x = i32::from_str(parts[1]).ok()?;
    let z = i32::from_str(parts[2]).ok()?;

    Some((x, z))
}

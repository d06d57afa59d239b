//! # Chunk Storage
//!
//! World data is organized into 16x16 columns of blocks spanning the
//! world's full vertical range.
//!
//! ## Column Stores
//!
//! The terrain pass never owns block storage: it writes through the
//! [`ColumnStore`] trait, one block at a time, in any Y order. Hosts plug
//! their own section-based storage in; [`ChunkBlocks`] is the flat
//! in-memory implementation used by the worker pool and the tests.
//!
//! ## Block Format
//!
//! Each block is a `(id, meta)` pair of `u16`s, `Pod`, so a whole chunk can
//! be viewed as raw bytes for hashing.

use bytemuck::{Pod, Zeroable};

use crate::config::WorldGeometry;
use crate::error::{ColumnError, ColumnResult, TerrainError, TerrainResult};
use crate::material::Material;

/// Chunk width/depth in blocks.
pub const CHUNK_SIZE: usize = 16;

/// Columns per chunk.
pub const COLUMNS_PER_CHUNK: usize = CHUNK_SIZE * CHUNK_SIZE;

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoord {
    /// Largest absolute chunk coordinate whose blocks, plus the biome window
    /// margin (`-8..=28` around the chunk), still fit in `i32`.
    pub const LIMIT: i32 = (i32::MAX - 28) / CHUNK_SIZE as i32;

    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts world block coordinates to chunk coordinate.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn from_block_pos(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_SIZE as i32),
            z: block_z.div_euclid(CHUNK_SIZE as i32),
        }
    }

    /// Returns the world X coordinate of the chunk's origin (corner).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn world_x(self) -> i32 {
        self.x.saturating_mul(CHUNK_SIZE as i32)
    }

    /// Returns the world Z coordinate of the chunk's origin.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn world_z(self) -> i32 {
        self.z.saturating_mul(CHUNK_SIZE as i32)
    }

    /// Whether both axes are within [`Self::LIMIT`].
    #[inline]
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn is_in_range(self) -> bool {
        self.x.unsigned_abs() <= Self::LIMIT as u32 && self.z.unsigned_abs() <= Self::LIMIT as u32
    }

    /// Checks [`Self::is_in_range`].
    ///
    /// Out-of-range chunks still generate without panicking (block positions
    /// saturate), but their terrain is not meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::ChunkOutOfRange`] if either axis is too large.
    pub fn validate(self) -> TerrainResult<()> {
        if self.is_in_range() {
            Ok(())
        } else {
            Err(TerrainError::ChunkOutOfRange {
                x: self.x,
                z: self.z,
                limit: Self::LIMIT,
            })
        }
    }
}

/// A single block in the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Block {
    /// Block type ID.
    pub id: u16,
    /// Block variant.
    pub meta: u16,
}

impl Block {
    /// Air block (empty).
    pub const AIR: Self = Self::new(0);
    /// Grass block.
    pub const GRASS: Self = Self::new(1);
    /// Stone block.
    pub const STONE: Self = Self::new(2);
    /// Dirt block.
    pub const DIRT: Self = Self::new(3);
    /// Coarse dirt (dirt variant 1).
    pub const COARSE_DIRT: Self = Self::with_meta(3, 1);
    /// Bedrock block.
    pub const BEDROCK: Self = Self::new(7);
    /// Water block.
    pub const WATER: Self = Self::new(10);
    /// Sand block.
    pub const SAND: Self = Self::new(11);
    /// Gravel block.
    pub const GRAVEL: Self = Self::new(13);
    /// Sandstone block.
    pub const SANDSTONE: Self = Self::new(24);
    /// Clay block.
    pub const CLAY: Self = Self::new(82);

    /// Creates a new block with given ID.
    #[inline]
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self { id, meta: 0 }
    }

    /// Creates a block with ID and variant.
    #[inline]
    #[must_use]
    pub const fn with_meta(id: u16, meta: u16) -> Self {
        Self { id, meta }
    }

    /// Returns true if this is an air block.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.id == 0
    }
}

impl From<Material> for Block {
    fn from(material: Material) -> Self {
        match material {
            Material::Air => Self::AIR,
            Material::Water => Self::WATER,
            Material::Bedrock => Self::BEDROCK,
            Material::Stone => Self::STONE,
            Material::Sandstone => Self::SANDSTONE,
            Material::Gravel => Self::GRAVEL,
            Material::Clay => Self::CLAY,
            Material::Sand => Self::SAND,
            Material::Dirt => Self::DIRT,
            Material::CoarseDirt => Self::COARSE_DIRT,
            Material::Grass => Self::GRASS,
        }
    }
}

/// Destination for terrain block writes.
///
/// Writes may arrive in any Y order. An error marks the column as failed;
/// the chunk generator then retries it with a fallback column.
pub trait ColumnStore {
    /// Writes one block.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is outside the store or its section
    /// is unavailable.
    fn set_block(
        &mut self,
        local_x: usize,
        y: i32,
        local_z: usize,
        material: Material,
    ) -> ColumnResult<()>;
}

/// Flat in-memory block storage for one chunk.
///
/// Indexed as `[(y - min_y)][z][x]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkBlocks {
    /// Chunk position in the world.
    pub coord: ChunkCoord,
    geometry: WorldGeometry,
    blocks: Box<[Block]>,
}

impl ChunkBlocks {
    /// Creates an all-air chunk.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn new(coord: ChunkCoord, geometry: WorldGeometry) -> Self {
        let levels = geometry.height().max(0) as usize;
        Self {
            coord,
            geometry,
            blocks: vec![Block::AIR; levels * COLUMNS_PER_CHUNK].into_boxed_slice(),
        }
    }

    /// Vertical bounds of this chunk.
    #[inline]
    #[must_use]
    pub const fn geometry(&self) -> &WorldGeometry {
        &self.geometry
    }

    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn index(&self, x: usize, y: i32, z: usize) -> Option<usize> {
        if x >= CHUNK_SIZE || z >= CHUNK_SIZE || y < self.geometry.min_y || y >= self.geometry.max_y
        {
            return None;
        }
        let level = (y - self.geometry.min_y) as usize;
        Some((level * CHUNK_SIZE + z) * CHUNK_SIZE + x)
    }

    /// Gets a block at local coordinates (air outside the chunk).
    #[inline]
    #[must_use]
    pub fn get_block(&self, x: usize, y: i32, z: usize) -> Block {
        self.index(x, y, z).map_or(Block::AIR, |i| self.blocks[i])
    }

    /// Highest non-air level of a column, if any.
    #[must_use]
    pub fn height(&self, x: usize, z: usize) -> Option<i32> {
        (self.geometry.min_y..self.geometry.max_y)
            .rev()
            .find(|&y| !self.get_block(x, y, z).is_air())
    }

    /// Highest solid (non-air, non-water) level of a column, if any.
    #[must_use]
    pub fn surface_height(&self, x: usize, z: usize) -> Option<i32> {
        (self.geometry.min_y..self.geometry.max_y).rev().find(|&y| {
            let block = self.get_block(x, y, z);
            !block.is_air() && block != Block::WATER
        })
    }

    /// Raw block data.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks)
    }

    /// FNV-1a hash of the raw block data.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for &byte in self.as_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        hash
    }
}

impl ColumnStore for ChunkBlocks {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn set_block(
        &mut self,
        local_x: usize,
        y: i32,
        local_z: usize,
        material: Material,
    ) -> ColumnResult<()> {
        if local_x >= CHUNK_SIZE || local_z >= CHUNK_SIZE {
            return Err(ColumnError::OutOfBounds {
                local_x: local_x as i32,
                local_z: local_z as i32,
            });
        }
        let index = self
            .index(local_x, y, local_z)
            .ok_or(ColumnError::LevelOutOfRange { y })?;
        self.blocks[index] = Block::from(material);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_from_block() {
        assert_eq!(ChunkCoord::from_block_pos(0, 0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block_pos(15, 15), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block_pos(16, 0), ChunkCoord::new(1, 0));
        assert_eq!(ChunkCoord::from_block_pos(-1, -1), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_block_pos(-16, -17), ChunkCoord::new(-1, -2));
        assert_eq!(ChunkCoord::new(-2, 3).world_x(), -32);
        assert_eq!(ChunkCoord::new(-2, 3).world_z(), 48);
    }

    #[test]
    fn test_extreme_coords_do_not_overflow() {
        let edge = ChunkCoord::new(ChunkCoord::LIMIT, -ChunkCoord::LIMIT);
        assert!(edge.validate().is_ok());
        assert!(edge.world_x().checked_add(28).is_some());
        assert!(edge.world_z().checked_sub(8).is_some());

        let beyond = ChunkCoord::new(ChunkCoord::LIMIT + 1, 0);
        assert!(!beyond.is_in_range());
        assert!(matches!(
            beyond.validate(),
            Err(TerrainError::ChunkOutOfRange { x, .. }) if x == ChunkCoord::LIMIT + 1
        ));

        let max = ChunkCoord::new(i32::MAX, i32::MIN);
        assert_eq!(max.world_x(), i32::MAX);
        assert_eq!(max.world_z(), i32::MIN);
        assert!(max.validate().is_err());
    }

    #[test]
    fn test_block_round_trip_through_store() {
        let mut chunk = ChunkBlocks::new(ChunkCoord::new(0, 0), WorldGeometry::new(-64, 64, 0));
        chunk.set_block(3, -64, 4, Material::Bedrock).unwrap();
        chunk.set_block(3, 10, 4, Material::Grass).unwrap();
        chunk.set_block(3, 5, 4, Material::Water).unwrap();

        assert_eq!(chunk.get_block(3, -64, 4), Block::BEDROCK);
        assert_eq!(chunk.get_block(3, 10, 4), Block::GRASS);
        assert_eq!(chunk.height(3, 4), Some(10));
        assert_eq!(chunk.height(0, 0), None);
    }

    #[test]
    fn test_surface_height_skips_water() {
        let mut chunk = ChunkBlocks::new(ChunkCoord::new(0, 0), WorldGeometry::default());
        chunk.set_block(0, 40, 0, Material::Sand).unwrap();
        for y in 41..64 {
            chunk.set_block(0, y, 0, Material::Water).unwrap();
        }
        assert_eq!(chunk.height(0, 0), Some(63));
        assert_eq!(chunk.surface_height(0, 0), Some(40));
    }

    #[test]
    fn test_out_of_range_writes_rejected() {
        let mut chunk = ChunkBlocks::new(ChunkCoord::new(0, 0), WorldGeometry::default());
        assert_eq!(
            chunk.set_block(16, 10, 0, Material::Stone),
            Err(ColumnError::OutOfBounds {
                local_x: 16,
                local_z: 0
            })
        );
        assert_eq!(
            chunk.set_block(0, 256, 0, Material::Stone),
            Err(ColumnError::LevelOutOfRange { y: 256 })
        );
        assert_eq!(chunk.get_block(0, -1, 0), Block::AIR);
    }

    #[test]
    fn test_material_blocks_distinct() {
        let materials = [
            Material::Air,
            Material::Water,
            Material::Bedrock,
            Material::Stone,
            Material::Sandstone,
            Material::Gravel,
            Material::Clay,
            Material::Sand,
            Material::Dirt,
            Material::CoarseDirt,
            Material::Grass,
        ];
        for (i, a) in materials.iter().enumerate() {
            for b in &materials[i + 1..] {
                assert_ne!(Block::from(*a), Block::from(*b), "{a:?} / {b:?}");
            }
        }
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let mut a = ChunkBlocks::new(ChunkCoord::new(0, 0), WorldGeometry::default());
        let b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.as_bytes().len(), 16 * 16 * 256 * 4);

        a.set_block(1, 1, 1, Material::Stone).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}

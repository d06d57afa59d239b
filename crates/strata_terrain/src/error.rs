//! # Terrain Error Types
//!
//! Two layers of failure:
//!
//! - [`TerrainError`]: configuration problems, raised once at construction.
//!   A generator that was built successfully never reports these again.
//! - [`ColumnError`]: something went wrong for a single 1x1 column. The chunk
//!   generator catches these, logs them and writes a fallback column instead.

use thiserror::Error;

/// Errors raised while building a generator or loading its configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    /// The vertical range is empty or cannot be split into 32 lattice cells.
    #[error("invalid Y range [{min_y}, {max_y}): height must be positive and a multiple of 32")]
    InvalidYRange {
        /// Lowest block level (inclusive).
        min_y: i32,
        /// Highest block level (exclusive).
        max_y: i32,
    },

    /// Sea level lies outside the world's vertical range.
    #[error("sea level {sea_level} outside of [{min_y}, {max_y})")]
    SeaLevelOutOfRange {
        /// Configured sea level.
        sea_level: i32,
        /// Lowest block level (inclusive).
        min_y: i32,
        /// Highest block level (exclusive).
        max_y: i32,
    },

    /// A biome height entry would break the elevation weighting.
    #[error("malformed biome height for biome {biome}: height {height}, scale {scale}")]
    InvalidBiomeHeight {
        /// Raw biome id.
        biome: u8,
        /// Offending base height.
        height: f64,
        /// Offending height scale.
        scale: f64,
    },

    /// A numeric parameter is outside its allowed range.
    #[error("parameter `{name}` out of range: {value}")]
    ParameterOutOfRange {
        /// Parameter name as it appears in the TOML file.
        name: &'static str,
        /// Value that was rejected.
        value: f64,
    },

    /// Configuration file could not be read or parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Block coordinates of the chunk do not fit in `i32`.
    #[error("chunk ({x}, {z}) is outside the supported range of +/-{limit}")]
    ChunkOutOfRange {
        /// Chunk X.
        x: i32,
        /// Chunk Z.
        z: i32,
        /// Largest supported absolute chunk coordinate.
        limit: i32,
    },

    /// A worker thread could not be started.
    #[error("failed to spawn terrain worker: {0}")]
    WorkerSpawn(String),

    /// The worker pool was shut down while work was still being submitted.
    #[error("worker pool is shut down")]
    PoolClosed,
}

/// Result type for generator construction.
pub type TerrainResult<T> = Result<T, TerrainError>;

/// Errors local to a single column.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColumnError {
    /// The column lies outside the 16x16 chunk.
    #[error("column ({local_x}, {local_z}) is outside the chunk")]
    OutOfBounds {
        /// Local X requested.
        local_x: i32,
        /// Local Z requested.
        local_z: i32,
    },

    /// A block write landed outside the store's vertical range.
    #[error("level {y} is outside the column store")]
    LevelOutOfRange {
        /// Block level requested.
        y: i32,
    },

    /// The store has no section for this level (unloaded or not allocated).
    #[error("no section allocated for level {y}")]
    MissingSection {
        /// Block level requested.
        y: i32,
    },

    /// Height arithmetic produced NaN or infinity.
    #[error("non-finite surface height {value}")]
    NonFiniteHeight {
        /// The value that was computed.
        value: f64,
    },
}

/// Result type for per-column work.
pub type ColumnResult<T> = Result<T, ColumnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = TerrainError::SeaLevelOutOfRange {
            sea_level: 300,
            min_y: 0,
            max_y: 256,
        };
        assert_eq!(err.to_string(), "sea level 300 outside of [0, 256)");

        let err = ColumnError::OutOfBounds {
            local_x: 16,
            local_z: -1,
        };
        assert!(err.to_string().contains("(16, -1)"));
    }
}

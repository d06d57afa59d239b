//! # Terrain Materials
//!
//! The handful of materials the terrain pass places, the three-layer stack
//! each biome uses, and the table that picks an in-between material where
//! two biomes meet.

/// A block material written by the terrain pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Material {
    /// Empty space.
    Air,
    /// Still water below sea level.
    Water,
    /// Indestructible floor.
    Bedrock,
    /// Stone.
    Stone,
    /// Sandstone.
    Sandstone,
    /// Gravel.
    Gravel,
    /// Clay.
    Clay,
    /// Sand.
    Sand,
    /// Dirt.
    Dirt,
    /// Coarse dirt.
    CoarseDirt,
    /// Grass block.
    Grass,
}

impl Material {
    /// Materials ranked for tie-breaking between two unrelated layers.
    const PREFERENCE: [Self; 8] = [
        Self::Stone,
        Self::Sandstone,
        Self::Gravel,
        Self::Clay,
        Self::Sand,
        Self::Dirt,
        Self::CoarseDirt,
        Self::Grass,
    ];

    /// Lowercase name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Water => "water",
            Self::Bedrock => "bedrock",
            Self::Stone => "stone",
            Self::Sandstone => "sandstone",
            Self::Gravel => "gravel",
            Self::Clay => "clay",
            Self::Sand => "sand",
            Self::Dirt => "dirt",
            Self::CoarseDirt => "coarse_dirt",
            Self::Grass => "grass",
        }
    }

    /// Whether the material fills its block.
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !matches!(self, Self::Air | Self::Water)
    }

    /// Material placed where a layer of `self` meets a layer of `other`.
    ///
    /// Symmetric. Known pairs have a dedicated in-between material; equal
    /// materials stay as they are; anything else resolves to whichever of the
    /// two ranks first in the preference order.
    #[must_use]
    pub fn transition(self, other: Self) -> Self {
        if self == other {
            return self;
        }
        let (a, b) = if self <= other { (self, other) } else { (other, self) };
        match (a, b) {
            (Self::Sand, Self::Grass | Self::Dirt) => Self::CoarseDirt,
            (Self::Stone, Self::Sand) => Self::Sandstone,
            (Self::Gravel, Self::Grass) => Self::Dirt,
            (Self::Gravel, Self::Sand) => Self::Sand,
            (Self::Sandstone, Self::Dirt) => Self::Sand,
            (Self::Stone, Self::Grass) => Self::CoarseDirt,
            _ => {
                if a.preference_rank() <= b.preference_rank() {
                    a
                } else {
                    b
                }
            }
        }
    }

    /// Position in the tie-break order (lower wins).
    #[must_use]
    pub fn preference_rank(self) -> usize {
        Self::PREFERENCE
            .iter()
            .position(|&m| m == self)
            .unwrap_or(Self::PREFERENCE.len())
    }
}

/// Surface / subsurface / deep material stack of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialLayers {
    /// Top block.
    pub surface: Material,
    /// Band directly below the top block.
    pub subsurface: Material,
    /// Everything further down (above bedrock).
    pub deep: Material,
}

impl MaterialLayers {
    /// Creates a stack.
    #[inline]
    #[must_use]
    pub const fn new(surface: Material, subsurface: Material, deep: Material) -> Self {
        Self {
            surface,
            subsurface,
            deep,
        }
    }

    /// Per-layer transition towards another stack.
    #[must_use]
    pub fn transition(self, other: Self) -> Self {
        Self::new(
            self.surface.transition(other.surface),
            self.subsurface.transition(other.subsurface),
            self.deep.transition(other.deep),
        )
    }

    /// Whether `material` is one of the three layers.
    #[must_use]
    pub fn contains(&self, material: Material) -> bool {
        self.surface == material || self.subsurface == material || self.deep == material
    }
}

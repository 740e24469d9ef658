//! Coordinate type definitions

use std::fmt;

/// Number of world blocks spanned by one tile along each axis.
pub const BLOCKS_PER_TILE: i32 = 512;

/// Tile coordinates in the world grid.
///
/// Equality and hashing are exact integer equality, so the type can be used
/// directly as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// X coordinate (east-west)
    pub x: i32,
    /// Z coordinate (north-south)
    pub z: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Inclusive rectangular range of tiles.
///
/// A range whose start exceeds its end on either axis is *invalid*; it is
/// still representable so that callers can pass raw user input through and
/// let the pipeline decide what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    /// First tile (inclusive)
    pub start: TileCoord,
    /// Last tile (inclusive)
    pub end: TileCoord,
}

impl TileRange {
    /// Creates a range from its four bounds.
    pub const fn new(start_x: i32, start_z: i32, end_x: i32, end_z: i32) -> Self {
        Self {
            start: TileCoord::new(start_x, start_z),
            end: TileCoord::new(end_x, end_z),
        }
    }

    /// Returns true if start <= end on both axes.
    pub fn is_valid(&self) -> bool {
        self.start.x <= self.end.x && self.start.z <= self.end.z
    }

    /// Top-left tile of the range.
    pub fn origin(&self) -> TileCoord {
        self.start
    }

    /// Number of tiles along x, or 0 if the range is invalid.
    pub fn tiles_wide(&self) -> u64 {
        span(self.start.x, self.end.x)
    }

    /// Number of tiles along z, or 0 if the range is invalid.
    pub fn tiles_high(&self) -> u64 {
        span(self.start.z, self.end.z)
    }

    /// Total number of tiles in the range, saturating at `u64::MAX`.
    pub fn tile_count(&self) -> u64 {
        self.tiles_wide().saturating_mul(self.tiles_high())
    }

    /// Returns true if the coordinate lies inside the range.
    pub fn contains(&self, coord: TileCoord) -> bool {
        (self.start.x..=self.end.x).contains(&coord.x)
            && (self.start.z..=self.end.z).contains(&coord.z)
    }

    /// Iterates all tiles, outer x then inner z, both ascending.
    ///
    /// Yields nothing for an invalid range.
    pub fn iter(&self) -> TileRangeIter {
        TileRangeIter {
            range: *self,
            next: self.is_valid().then_some(self.start),
        }
    }
}

impl IntoIterator for &TileRange {
    type Item = TileCoord;
    type IntoIter = TileRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for TileRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

fn span(start: i32, end: i32) -> u64 {
    if start > end {
        0
    } else {
        (end as i64 - start as i64 + 1) as u64
    }
}

/// Iterator over the tiles of a [`TileRange`].
#[derive(Debug, Clone)]
pub struct TileRangeIter {
    range: TileRange,
    next: Option<TileCoord>,
}

impl Iterator for TileRangeIter {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        self.next = if current.z < self.range.end.z {
            Some(TileCoord::new(current.x, current.z + 1))
        } else if current.x < self.range.end.x {
            Some(TileCoord::new(current.x + 1, self.range.start.z))
        } else {
            None
        };

        Some(current)
    }
}

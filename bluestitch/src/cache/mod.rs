//! Session cache of fetched tiles.
//!
//! The two-phase flow fetches a range once into a [`TileCache`] and then
//! renders it any number of times with different blend settings. Entries
//! live only as long as the cache value; nothing is persisted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::coord::{TileCoord, TileRange};
use crate::tile::RawTile;

/// Concurrent map from tile coordinate to decoded tile.
///
/// Safe to fill from several fetch workers at once. Values are shared via
/// `Arc`, so readers never copy pixel data.
#[derive(Debug, Default)]
pub struct TileCache {
    tiles: DashMap<TileCoord, Arc<RawTile>>,
    bytes: AtomicU64,
}

impl TileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a tile, replacing any previous entry for the coordinate.
    pub fn insert(&self, coord: TileCoord, tile: RawTile) {
        let added = tile.encoded_len() as u64;
        if let Some(previous) = self.tiles.insert(coord, Arc::new(tile)) {
            self.bytes
                .fetch_sub(previous.encoded_len() as u64, Ordering::Relaxed);
        }
        self.bytes.fetch_add(added, Ordering::Relaxed);
    }

    /// Looks up a tile.
    pub fn get(&self, coord: TileCoord) -> Option<Arc<RawTile>> {
        self.tiles.get(&coord).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    /// Number of cached tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Total encoded size of all cached tiles as downloaded.
    pub fn total_bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    /// Coordinates of `range` that have no cached tile, in iteration order.
    pub fn missing_in(&self, range: &TileRange) -> Vec<TileCoord> {
        range.iter().filter(|c| !self.contains(*c)).collect()
    }

    /// Drops every cached tile.
    pub fn clear(&self) {
        self.tiles.clear();
        self.bytes.store(0, Ordering::Relaxed);
    }
}

/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! The call's tile registry and the transitions that act on it as a whole.
//!
//! Zoom is a global mode, not a per-tile flag flip: zooming one tile
//! suppresses every other tile, and leaving zoom restores all of them, so the
//! transitions live here rather than on [Tile].

use super::join_ordered_map::JoinOrderedMap;
use super::tile::Tile;

/// Result of lazily registering a participant seen in an inbound event.
#[derive(Debug)]
pub(crate) enum TileStatus {
    Added(String),
    NoChange,
}

/// All tiles of the active session: the fixed local slot plus one remote tile
/// per participant, ordered by join.
#[derive(Debug)]
pub struct TileSet {
    local: Tile,
    remotes: JoinOrderedMap<String, Tile>,
}

impl TileSet {
    pub(crate) fn new(local_id: String, local_display_name: String) -> Self {
        Self {
            local: Tile::local(local_id, local_display_name),
            remotes: JoinOrderedMap::new(),
        }
    }

    pub fn local(&self) -> &Tile {
        &self.local
    }

    pub(crate) fn local_mut(&mut self) -> &mut Tile {
        &mut self.local
    }

    pub fn get(&self, id: &str) -> Option<&Tile> {
        if self.local.id == id {
            Some(&self.local)
        } else {
            self.remotes.get(id)
        }
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Tile> {
        if self.local.id == id {
            Some(&mut self.local)
        } else {
            self.remotes.get_mut(id)
        }
    }

    /// Participant count, local included.
    pub fn len(&self) -> usize {
        1 + self.remotes.len()
    }

    /// Tile ids for rendering: the local slot first, then remotes in join
    /// order.
    pub fn ids(&self) -> Vec<String> {
        std::iter::once(self.local.id.clone())
            .chain(self.remotes.iter().map(|(id, _)| id.clone()))
            .collect()
    }

    /// Number of tiles the layout engine should size the grid for.
    pub fn eligible_count(&self) -> usize {
        self.iter().filter(|tile| tile.is_eligible()).count()
    }

    pub(crate) fn zoomed_id(&self) -> Option<String> {
        self.iter()
            .find(|tile| tile.is_zoomed())
            .map(|tile| tile.id.clone())
    }

    fn iter(&self) -> impl Iterator<Item = &Tile> {
        std::iter::once(&self.local).chain(self.remotes.values())
    }

    /// Registers a joining participant. An id already present keeps its tile
    /// (and join position) but picks up the announced display name.
    pub(crate) fn insert_remote(&mut self, id: &str, display_name: &str) -> TileStatus {
        if self.local.id == id {
            return TileStatus::NoChange;
        }
        if let Some(existing) = self.remotes.get_mut(id) {
            existing.display_name = display_name.to_string();
            return TileStatus::NoChange;
        }
        let mut tile = Tile::remote(id.to_string(), display_name.to_string());
        // A join during an active zoom starts suppressed, like any other
        // non-focused tile.
        tile.hidden_by_zoom = self.zoomed_id().is_some();
        self.remotes.insert(id.to_string(), tile);
        TileStatus::Added(id.to_string())
    }

    /// Registers a participant first seen through a track event that raced
    /// ahead of its join announcement. The id doubles as the display name
    /// until the join event delivers the real one.
    pub(crate) fn ensure_remote(&mut self, id: &str) -> TileStatus {
        if self.local.id == id || self.remotes.contains_key(id) {
            return TileStatus::NoChange;
        }
        self.insert_remote(id, id)
    }

    /// Removes a departed participant. If the departed tile held the zoom,
    /// the survivors return to the normal grid: the focus target is gone.
    pub(crate) fn remove_remote(&mut self, id: &str) -> Option<Tile> {
        let removed = self.remotes.remove(id)?;
        if removed.is_zoomed() {
            self.zoom_out_all();
        }
        Some(removed)
    }

    /// Drops every remote tile (session teardown). The local tile survives
    /// with its media state intact.
    pub(crate) fn clear_remotes(&mut self) -> usize {
        let removed = self.remotes.len();
        let remote_was_zoomed = self.remotes.values().any(|tile| tile.is_zoomed());
        self.remotes.clear();
        if remote_was_zoomed {
            self.zoom_out_all();
        }
        removed
    }

    /// A click on a tile's video surface.
    ///
    /// With no zoom active, a click on a visible tile focuses it and
    /// suppresses every other tile. A click on the focused tile leaves zoom
    /// globally. Clicks on hidden or suppressed tiles (which render no
    /// surface) and on unknown ids are ignored.
    ///
    /// Returns `true` if any tile state changed.
    pub(crate) fn click(&mut self, id: &str) -> bool {
        match self.zoomed_id() {
            Some(zoomed) => {
                if zoomed == id {
                    self.zoom_out_all();
                    true
                } else {
                    false
                }
            }
            None => {
                if !self.get(id).is_some_and(|tile| tile.is_visible()) {
                    return false;
                }
                self.for_each_tile_mut(|tile| {
                    if tile.id == id {
                        tile.zoomed = true;
                        tile.hidden_by_zoom = false;
                    } else {
                        tile.hidden_by_zoom = true;
                    }
                });
                true
            }
        }
    }

    pub(crate) fn zoom_out_all(&mut self) {
        self.for_each_tile_mut(|tile| {
            tile.zoomed = false;
            tile.hidden_by_zoom = false;
        });
    }

    /// Applies a video-track enable/disable notification. Returns `true` on
    /// an actual change. Zoom flags are left untouched: a tile re-enabled
    /// under someone else's zoom stays suppressed, and a zoomed tile whose
    /// track drops keeps the focus it will show again when re-enabled.
    pub(crate) fn set_track_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.get_mut(id) {
            Some(tile) if tile.track_enabled != enabled => {
                tile.track_enabled = enabled;
                true
            }
            _ => false,
        }
    }

    fn for_each_tile_mut(&mut self, mut apply: impl FnMut(&mut Tile)) {
        apply(&mut self.local);
        for tile in self.remotes.values_mut() {
            apply(tile);
        }
    }
}

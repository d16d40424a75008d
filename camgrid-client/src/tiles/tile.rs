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

//! Per-participant tile state.
//!
//! All presentation-relevant state lives in explicit fields here; the
//! rendering layer translates state into markup/styles and never feeds
//! presentation back into the core.

use serde::{Deserialize, Serialize};

/// Rotation of a tile's video content, user-controlled per tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// The rotate control steps counter-clockwise: 0° → 270° → 180° → 90° → 0°.
    pub fn next(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg0,
        }
    }

    /// Quarter turns exchange the rendered width and height. The grid slot
    /// allocated to the tile is unaffected.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// Where a tile stands in the grid's visibility state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileState {
    /// Rendered in the grid at the shared tile size.
    Normal,
    /// The owner disabled their video track; the record stays, the tile does
    /// not render and does not count toward layout.
    Hidden,
    /// Selected for exclusive focus; the only tile the grid shows.
    ZoomedIn,
    /// Suppressed because a different tile is zoomed.
    HiddenByZoom,
}

/// One participant's tile. Created on join (the local tile at client startup),
/// removed only when the participant leaves.
#[derive(Clone, Debug)]
pub struct Tile {
    pub id: String,
    pub display_name: String,
    pub is_local: bool,
    pub(crate) zoomed: bool,
    pub(crate) hidden_by_zoom: bool,
    pub(crate) track_enabled: bool,
    pub(crate) audio_muted: bool,
    pub(crate) rotation: Rotation,
}

impl Tile {
    pub(crate) fn local(id: String, display_name: String) -> Self {
        Self::new(id, display_name, true)
    }

    pub(crate) fn remote(id: String, display_name: String) -> Self {
        Self::new(id, display_name, false)
    }

    fn new(id: String, display_name: String, is_local: bool) -> Self {
        Self {
            id,
            display_name,
            is_local,
            zoomed: false,
            hidden_by_zoom: false,
            track_enabled: true,
            audio_muted: false,
            rotation: Rotation::default(),
        }
    }

    /// A disabled track always wins the classification: the tile has no
    /// content to show regardless of any zoom in progress.
    pub fn state(&self) -> TileState {
        if !self.track_enabled {
            TileState::Hidden
        } else if self.zoomed {
            TileState::ZoomedIn
        } else if self.hidden_by_zoom {
            TileState::HiddenByZoom
        } else {
            TileState::Normal
        }
    }

    /// Eligible tiles are the ones the layout engine sizes the grid for.
    pub fn is_eligible(&self) -> bool {
        matches!(self.state(), TileState::Normal | TileState::ZoomedIn)
    }

    /// Visibility coincides with eligibility: a tile is rendered exactly when
    /// it occupies a grid slot.
    pub fn is_visible(&self) -> bool {
        self.is_eligible()
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn is_audio_muted(&self) -> bool {
        self.audio_muted
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub(crate) fn rotate(&mut self) {
        self.rotation = self.rotation.next();
    }

    pub fn view_model(&self) -> TileViewModel {
        TileViewModel {
            tile_id: self.id.clone(),
            display_name: self.display_name.clone(),
            is_local: self.is_local,
            visible: self.is_visible(),
            zoomed: self.zoomed,
            rotation: self.rotation,
            audio_muted: self.audio_muted,
        }
    }
}

/// Snapshot handed to the rendering layer; plain data, serializable across a
/// JS bridge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileViewModel {
    pub tile_id: String,
    pub display_name: String,
    pub is_local: bool,
    pub visible: bool,
    pub zoomed: bool,
    pub rotation: Rotation,
    /// Drives the mute icon next to the tile label. Display intent only: for
    /// remote tiles this is gossip state, never an actual audio control.
    pub audio_muted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_cycles_counter_clockwise() {
        let mut rotation = Rotation::default();
        let mut seen = vec![rotation.degrees()];
        for _ in 0..4 {
            rotation = rotation.next();
            seen.push(rotation.degrees());
        }
        assert_eq!(seen, vec![0, 270, 180, 90, 0]);
    }

    #[test]
    fn only_quarter_turns_swap_axes() {
        assert!(!Rotation::Deg0.swaps_axes());
        assert!(Rotation::Deg90.swaps_axes());
        assert!(!Rotation::Deg180.swaps_axes());
        assert!(Rotation::Deg270.swaps_axes());
    }

    #[test]
    fn disabled_track_hides_even_a_zoomed_tile() {
        let mut tile = Tile::remote("PA1".into(), "porch".into());
        tile.zoomed = true;
        assert_eq!(tile.state(), TileState::ZoomedIn);
        tile.track_enabled = false;
        assert_eq!(tile.state(), TileState::Hidden);
        assert!(!tile.is_eligible());
    }

    #[test]
    fn view_models_marshal_across_the_bridge() {
        let mut tile = Tile::remote("PA3".into(), "porch".into());
        tile.rotate();
        let json = serde_json::to_string(&tile.view_model()).unwrap();
        assert!(json.contains("\"rotation\":\"Deg270\""), "{json}");
        let back: TileViewModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tile.view_model());
    }

    #[test]
    fn suppressed_tile_is_retained_but_ineligible() {
        let mut tile = Tile::remote("PA2".into(), "garage".into());
        tile.hidden_by_zoom = true;
        assert_eq!(tile.state(), TileState::HiddenByZoom);
        assert!(!tile.is_visible());
        assert!(!tile.view_model().visible);
        assert_eq!(tile.view_model().tile_id, "PA2");
    }
}

//! This crate is the client-side core of a multi-party video call UI. It owns
//! the state with actual logic in it — the adaptive tile grid, the per-tile
//! zoom/rotate/visibility machine, and mute-state gossip over the call's side
//! channel — and leaves media capture, the join handshake, the real-time
//! transport, and DOM construction to the embedding app.
//!
//! This crate intends to make no assumptions about the UI or the HTML of the
//! client app. Every seam is a [Callback]: the embedder forwards session and
//! track events into the [CamGridClient], wires the UI controls to its entry
//! points, and renders from [GridStyle] and [TileViewModel] snapshots.
//!
//! # Outline of usage
//!
//! For more detailed documentation see the doc for each struct.
//!
//! ## Client creation and connection:
//! ```ignore
//! let options = CamGridClientOptions {...}; // identity and callbacks for the seams
//! let client = CamGridClient::new(options);
//!
//! client.on_viewport_resize(1200.0, 800.0);
//! client.connect()?;
//! ```
//!
//! ## Feeding session events:
//! ```ignore
//! client.session_joined();
//! client.on_participant_joined("PA123", "front door");
//! client.on_track_enabled_changed("PA123", TrackKind::Video, false);
//! client.on_channel_message("mute PA123");
//! ```
//!
//! ## UI wiring:
//! ```ignore
//! client.toggle_local_audio();
//! client.on_tile_clicked("PA123")?;
//! client.rotate_tile("PA123")?;
//!
//! let style = client.layout_style();       // one shared rule for all tiles
//! for id in client.tile_ids() {
//!     let tile = client.tile_view_model(&id).unwrap();
//! }
//! ```

mod client;
mod constants;
mod layout;
mod media;
mod mute_sync;
mod tiles;

#[cfg(test)]
mod tests;

pub use client::{CamGridClient, CamGridClientOptions, SessionStatus};
pub use constants::TILE_ASPECT_RATIO;
pub use layout::{compute_tile_width, GridStyle, Viewport};
pub use media::CameraSwitch;
pub use tiles::{Rotation, Tile, TileState, TileViewModel};

pub use camgrid_types::{Callback, MuteKind, MuteMessage, MuteParseError, TrackKind};

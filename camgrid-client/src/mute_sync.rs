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

//! Mute-state gossip over the side channel.
//!
//! The media transport carries no mute metadata, so clients tell each other.
//! Delivery is best-effort: a lost frame leaves a stale icon until the next
//! toggle or state-query round, which is accepted.

use camgrid_types::{Callback, MuteKind, MuteMessage};
use log::debug;

use crate::tiles::TileSet;

/// What the orchestrator must do after an inbound frame was handled.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum MuteSyncOutcome {
    /// Nothing further; the frame was dropped or fully absorbed.
    None,
    /// A remote tile's displayed mute state changed.
    RemoteUpdated(String),
    /// The frame named the local participant: run the full local mute toggle
    /// path, broadcast included, exactly as if the user pressed the button.
    LocalToggleRequested,
}

/// Gossip endpoint for one client.
#[derive(Debug)]
pub(crate) struct MuteSync {
    local_id: String,
    outbound: Callback<MuteMessage>,
}

impl MuteSync {
    pub(crate) fn new(local_id: String, outbound: Callback<MuteMessage>) -> Self {
        Self { local_id, outbound }
    }

    /// Broadcasts the local participant's current mute state.
    pub(crate) fn announce_local(&self, muted: bool) {
        let message = if muted {
            MuteMessage::mute(self.local_id.clone())
        } else {
            MuteMessage::unmute(self.local_id.clone())
        };
        self.outbound.emit(message);
    }

    /// Asks currently-muted participants to re-announce themselves. Sent once
    /// when this client's side channel comes up, so a late joiner converges
    /// without a roster snapshot.
    pub(crate) fn query_state(&self) {
        self.outbound.emit(MuteMessage::state_query(self.local_id.clone()));
    }

    /// Handles one raw side-channel frame.
    ///
    /// Remote subjects only ever update the displayed mute state on their
    /// tile; this client cannot mute anyone else's audio. Malformed frames
    /// are dropped: the channel is best-effort and garbage must not crash the
    /// call.
    pub(crate) fn handle(
        &self,
        raw: &str,
        locally_muted: bool,
        tiles: &mut TileSet,
    ) -> MuteSyncOutcome {
        let message: MuteMessage = match raw.parse() {
            Ok(message) => message,
            Err(error) => {
                debug!("dropping malformed side-channel frame {raw:?}: {error}");
                return MuteSyncOutcome::None;
            }
        };

        match message.kind {
            MuteKind::StateQuery => {
                if locally_muted {
                    self.announce_local(true);
                }
                MuteSyncOutcome::None
            }
            MuteKind::Mute | MuteKind::Unmute => {
                if message.subject_id == self.local_id {
                    return MuteSyncOutcome::LocalToggleRequested;
                }
                let muted = message.kind == MuteKind::Mute;
                match tiles.get_mut(&message.subject_id) {
                    Some(tile) => {
                        tile.audio_muted = muted;
                        MuteSyncOutcome::RemoteUpdated(message.subject_id)
                    }
                    None => {
                        debug!(
                            "dropping mute gossip for unknown participant {}",
                            message.subject_id
                        );
                        MuteSyncOutcome::None
                    }
                }
            }
        }
    }
}

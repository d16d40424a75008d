use crate::layout::{GridStyle, Viewport};
use crate::media::{CameraSwitch, LocalMedia, SwitchResolution};
use crate::mute_sync::{MuteSync, MuteSyncOutcome};
use crate::tiles::{TileSet, TileStatus, TileViewModel};
use anyhow::{anyhow, Result};
use camgrid_types::{Callback, MuteMessage, TrackKind};
use log::{debug, error, info};
use std::cell::RefCell;
use std::rc::Rc;

/// Options struct for constructing a client via
/// [CamGridClient::new(options)][CamGridClient::new].
///
/// The session, capture, and rendering layers are all external; every seam to
/// them is a callback here. Callbacks default to no-ops, so an embedder wires
/// only what it consumes.
#[derive(Clone, Debug, PartialEq)]
pub struct CamGridClientOptions {
    /// The local participant's session id. It appears as this client's tile
    /// id and as the subject of its mute gossip.
    pub user_id: String,

    /// Label rendered on the local tile.
    pub display_name: String,

    /// Callback will be called as `callback(frame)` with a serialized gossip
    /// frame to broadcast on the side channel.
    pub send_channel_message: Callback<String>,

    /// Callback will be called as `callback(())` when [connect()][CamGridClient::connect]
    /// wants the external session layer to run the join handshake.
    pub start_session: Callback<()>,

    /// Callback will be called as `callback(())` when the client leaves the
    /// session.
    pub end_session: Callback<()>,

    /// Callback will be called as `callback(request)` for the capture layer
    /// to acquire the requested camera; it must report back through
    /// [camera_switch_complete()][CamGridClient::camera_switch_complete] with
    /// the request's generation.
    pub request_camera_switch: Callback<CameraSwitch>,

    /// Callback will be called as `callback(())` once the join handshake
    /// completes.
    pub on_connected: Callback<()>,

    /// Callback will be called as `callback(reason)` when joining fails or an
    /// established session is lost. One blocking notice; no automatic retry.
    pub on_connection_lost: Callback<String>,

    /// Callback will be called as `callback(peer_id)` when a new peer's tile
    /// is created.
    pub on_peer_added: Callback<String>,

    /// Callback will be called as `callback(peer_id)` when a peer's tile is
    /// removed.
    pub on_peer_removed: Callback<String>,

    /// Callback will be called as `callback(style)` whenever the shared tile
    /// dimensions change; apply it as one style rule covering every tile.
    pub on_layout_changed: Callback<GridStyle>,

    /// Callback will be called as `callback(tile_id)` when a single tile's
    /// view model should be re-read (mute icon, rotation, visibility, zoom).
    pub on_tile_updated: Callback<String>,

    /// Callback will be called as `callback(count)` when the participant
    /// count changes, local tile included.
    pub on_participant_count_changed: Callback<usize>,
}

/// Where the client stands relative to the externally-run join handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug)]
struct Inner {
    options: CamGridClientOptions,
    status: SessionStatus,
    viewport: Viewport,
    tiles: TileSet,
    media: LocalMedia,
    mute_sync: MuteSync,
    layout: GridStyle,
}

/// The client core for one call session.
///
/// Construct with [new(options)][Self::new], then [connect()][Self::connect]
/// when the user joins. The session/media layer reports its events through
/// the `on_*` methods; the UI calls the toggle/click/rotate entry points and
/// reads state back through [layout_style()][Self::layout_style] and
/// [tile_view_model()][Self::tile_view_model].
///
/// All state lives behind a single `RefCell`; handlers run to completion on
/// the embedder's event loop, so there is no locking. A handler arriving
/// while another borrow is live (a re-entrant callback) is dropped with an
/// error log rather than panicking.
#[derive(Clone, Debug)]
pub struct CamGridClient {
    options: CamGridClientOptions,
    inner: Rc<RefCell<Inner>>,
}

impl PartialEq for CamGridClient {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner) && self.options == other.options
    }
}

impl CamGridClient {
    /// Constructor for the client struct.
    ///
    /// See [CamGridClientOptions] for description of the options.
    ///
    /// The local tile exists from this moment on; it never leaves the tile
    /// set while the client lives.
    pub fn new(options: CamGridClientOptions) -> Self {
        let outbound = options
            .send_channel_message
            .reform(|message: MuteMessage| message.to_wire());
        let inner = Rc::new(RefCell::new(Inner {
            status: SessionStatus::Disconnected,
            viewport: Viewport::default(),
            tiles: TileSet::new(options.user_id.clone(), options.display_name.clone()),
            media: LocalMedia::new(),
            mute_sync: MuteSync::new(options.user_id.clone(), outbound),
            layout: GridStyle::default(),
            options: options.clone(),
        }));
        Self { options, inner }
    }

    /// Asks the external session layer to join the call.
    ///
    /// Completion arrives later through [session_joined()][Self::session_joined]
    /// or [session_failed()][Self::session_failed].
    pub fn connect(&self) -> Result<()> {
        let mut inner = self
            .inner
            .try_borrow_mut()
            .map_err(|_| anyhow!("client is busy"))?;
        inner.connect()
    }

    /// Leaves the session: every remote tile is dropped, the local tile and
    /// its media state survive for the next call.
    pub fn disconnect(&self) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.disconnect(),
            Err(_) => error!("dropping disconnect: client is busy"),
        }
    }

    /// Reported by the session layer when the join handshake completes.
    pub fn session_joined(&self) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.session_joined(),
            Err(_) => error!("dropping session-joined: client is busy"),
        }
    }

    /// Reported by the session layer when joining fails or an established
    /// session is lost. The reason is opaque to the core.
    pub fn session_failed(&self, reason: String) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.session_failed(reason),
            Err(_) => error!("dropping session-failed: client is busy"),
        }
    }

    pub fn on_participant_joined(&self, id: &str, display_name: &str) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.participant_joined(id, display_name),
            Err(_) => error!("dropping participant-joined for {id}: client is busy"),
        }
    }

    pub fn on_participant_left(&self, id: &str) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.participant_left(id),
            Err(_) => error!("dropping participant-left for {id}: client is busy"),
        }
    }

    pub fn on_track_subscribed(&self, participant_id: &str, kind: TrackKind) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.track_subscribed(participant_id, kind),
            Err(_) => error!("dropping track-subscribed for {participant_id}: client is busy"),
        }
    }

    pub fn on_track_unsubscribed(&self, participant_id: &str, kind: TrackKind) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.track_unsubscribed(participant_id, kind),
            Err(_) => error!("dropping track-unsubscribed for {participant_id}: client is busy"),
        }
    }

    pub fn on_track_enabled_changed(&self, participant_id: &str, kind: TrackKind, enabled: bool) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.track_enabled_changed(participant_id, kind, enabled),
            Err(_) => error!("dropping track-enabled change for {participant_id}: client is busy"),
        }
    }

    /// One raw frame from the side channel.
    pub fn on_channel_message(&self, raw: &str) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.channel_message(raw),
            Err(_) => error!("dropping side-channel frame: client is busy"),
        }
    }

    pub fn on_viewport_resize(&self, width: f64, height: f64) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.viewport_resize(width, height),
            Err(_) => error!("dropping viewport resize: client is busy"),
        }
    }

    /// Flips the local microphone and gossips the new state.
    pub fn toggle_local_audio(&self) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.toggle_audio(),
            Err(_) => error!("dropping audio toggle: client is busy"),
        }
    }

    /// Flips the local camera; with the camera off the local tile leaves the
    /// grid like any other disabled track.
    pub fn toggle_local_video(&self) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.toggle_video(),
            Err(_) => error!("dropping video toggle: client is busy"),
        }
    }

    /// Requests a switch to the next camera in the roster.
    pub fn cycle_camera(&self) -> Result<()> {
        let mut inner = self
            .inner
            .try_borrow_mut()
            .map_err(|_| anyhow!("client is busy"))?;
        inner.cycle_camera()
    }

    /// Reported by the capture layer when a camera switch finishes. The
    /// generation must be the one carried by the [CameraSwitch] request;
    /// completions of superseded requests are discarded.
    pub fn camera_switch_complete(&self, generation: u64, success: bool) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.camera_switch_complete(generation, success),
            Err(_) => error!("dropping camera-switch completion: client is busy"),
        }
    }

    /// Replaces the known camera roster (external device enumeration result).
    pub fn set_video_devices(&self, device_ids: Vec<String>) {
        match self.inner.try_borrow_mut() {
            Ok(mut inner) => inner.media.set_devices(device_ids),
            Err(_) => error!("dropping device roster update: client is busy"),
        }
    }

    /// Advances a tile's content rotation one step. The grid slot size is
    /// unaffected; only the tile's rendering swaps axes.
    pub fn rotate_tile(&self, tile_id: &str) -> Result<()> {
        let mut inner = self
            .inner
            .try_borrow_mut()
            .map_err(|_| anyhow!("client is busy"))?;
        inner.rotate_tile(tile_id)
    }

    /// A click on a tile's video surface: zoom in on it, or leave zoom if it
    /// is the focused tile.
    pub fn on_tile_clicked(&self, tile_id: &str) -> Result<()> {
        let mut inner = self
            .inner
            .try_borrow_mut()
            .map_err(|_| anyhow!("client is busy"))?;
        inner.tile_clicked(tile_id)
    }

    /// The current shared tile dimensions, for applying as one style rule.
    pub fn layout_style(&self) -> GridStyle {
        match self.inner.try_borrow() {
            Ok(inner) => inner.layout,
            Err(_) => {
                error!("unable to read layout style: client is busy");
                GridStyle::default()
            }
        }
    }

    /// Rendering snapshot for one tile.
    pub fn tile_view_model(&self, tile_id: &str) -> Option<TileViewModel> {
        match self.inner.try_borrow() {
            Ok(inner) => inner.tiles.get(tile_id).map(|tile| tile.view_model()),
            Err(_) => {
                error!("unable to read tile view model: client is busy");
                None
            }
        }
    }

    /// Tile ids in render order: the local tile first, then remotes by join.
    pub fn tile_ids(&self) -> Vec<String> {
        match self.inner.try_borrow() {
            Ok(inner) => inner.tiles.ids(),
            Err(_) => Vec::new(),
        }
    }

    /// Participant count, local included.
    pub fn participant_count(&self) -> usize {
        match self.inner.try_borrow() {
            Ok(inner) => inner.tiles.len(),
            Err(_) => 0,
        }
    }

    /// Returns `true` if the client is currently connected to a session.
    pub fn is_connected(&self) -> bool {
        self.session_status() == SessionStatus::Connected
    }

    pub fn session_status(&self) -> SessionStatus {
        match self.inner.try_borrow() {
            Ok(inner) => inner.status,
            Err(_) => SessionStatus::Disconnected,
        }
    }

    /// Whether a camera-switch control should be offered right now.
    pub fn can_cycle_camera(&self) -> bool {
        match self.inner.try_borrow() {
            Ok(inner) => inner.media.can_cycle(),
            Err(_) => false,
        }
    }

    /// Returns a reference to a copy of
    /// [`options.user_id`](CamGridClientOptions::user_id).
    pub fn user_id(&self) -> &String {
        &self.options.user_id
    }
}

impl Inner {
    fn connect(&mut self) -> Result<()> {
        if self.status != SessionStatus::Disconnected {
            return Err(anyhow!("session is already {:?}", self.status));
        }
        info!("{} joining call session", self.options.user_id);
        self.status = SessionStatus::Connecting;
        self.options.start_session.emit(());
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.status == SessionStatus::Disconnected {
            debug!("ignoring disconnect: no session");
            return;
        }
        info!("{} leaving call session", self.options.user_id);
        self.status = SessionStatus::Disconnected;
        self.options.end_session.emit(());
        if self.tiles.clear_remotes() > 0 {
            self.emit_participant_count();
        }
        self.update_layout();
    }

    fn session_joined(&mut self) {
        if self.status != SessionStatus::Connecting {
            debug!("ignoring session-joined while {:?}", self.status);
            return;
        }
        info!("{} joined call session", self.options.user_id);
        self.status = SessionStatus::Connected;
        self.options.on_connected.emit(());
        // The side channel is up now; ask muted participants to re-announce
        // so our freshly-built roster shows the right icons.
        self.mute_sync.query_state();
    }

    fn session_failed(&mut self, reason: String) {
        if self.status == SessionStatus::Disconnected {
            debug!("ignoring session failure while disconnected: {reason}");
            return;
        }
        error!("call session failed: {reason}");
        self.status = SessionStatus::Disconnected;
        if self.tiles.clear_remotes() > 0 {
            self.emit_participant_count();
        }
        self.update_layout();
        self.options.on_connection_lost.emit(reason);
    }

    fn participant_joined(&mut self, id: &str, display_name: &str) {
        match self.tiles.insert_remote(id, display_name) {
            TileStatus::Added(peer_id) => {
                debug!("added peer {peer_id}");
                self.options.on_peer_added.emit(peer_id);
                self.emit_participant_count();
                self.update_layout();
            }
            TileStatus::NoChange => debug!("repeated join for {id}"),
        }
    }

    fn participant_left(&mut self, id: &str) {
        if self.tiles.remove_remote(id).is_none() {
            debug!("ignoring departure of unknown participant {id}");
            return;
        }
        debug!("removed peer {id}");
        self.options.on_peer_removed.emit(id.to_string());
        self.emit_participant_count();
        self.update_layout();
    }

    fn track_subscribed(&mut self, participant_id: &str, kind: TrackKind) {
        debug!("<< subscribed {kind} track of {participant_id}");
        // Track events can race ahead of the join announcement; make sure the
        // tile exists either way.
        if let TileStatus::Added(peer_id) = self.tiles.ensure_remote(participant_id) {
            self.options.on_peer_added.emit(peer_id);
            self.emit_participant_count();
            self.update_layout();
        }
    }

    fn track_unsubscribed(&mut self, participant_id: &str, kind: TrackKind) {
        if kind != TrackKind::Video {
            debug!("ignoring unsubscribed {kind} track of {participant_id}");
            return;
        }
        let Some(tile) = self.tiles.get(participant_id) else {
            debug!("ignoring unsubscribed track of unknown participant {participant_id}");
            return;
        };
        let was_zoomed = tile.is_zoomed();
        let changed = self.tiles.set_track_enabled(participant_id, false);
        if was_zoomed {
            // The focused content is gone; give the grid back to everyone.
            self.tiles.zoom_out_all();
        }
        if changed || was_zoomed {
            self.options.on_tile_updated.emit(participant_id.to_string());
            self.update_layout();
        }
    }

    fn track_enabled_changed(&mut self, participant_id: &str, kind: TrackKind, enabled: bool) {
        if kind != TrackKind::Video {
            debug!("ignoring enabled={enabled} for {kind} track of {participant_id}");
            return;
        }
        if self.tiles.set_track_enabled(participant_id, enabled) {
            self.options.on_tile_updated.emit(participant_id.to_string());
            self.update_layout();
        }
    }

    fn channel_message(&mut self, raw: &str) {
        let locally_muted = !self.media.is_audio_enabled();
        match self.mute_sync.handle(raw, locally_muted, &mut self.tiles) {
            MuteSyncOutcome::RemoteUpdated(tile_id) => {
                self.options.on_tile_updated.emit(tile_id);
            }
            MuteSyncOutcome::LocalToggleRequested => self.toggle_audio(),
            MuteSyncOutcome::None => {}
        }
    }

    fn viewport_resize(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
        self.update_layout();
    }

    fn toggle_audio(&mut self) {
        let enabled = self.media.toggle_audio();
        let local_id = self.options.user_id.clone();
        self.tiles.local_mut().audio_muted = !enabled;
        self.mute_sync.announce_local(!enabled);
        self.options.on_tile_updated.emit(local_id);
    }

    fn toggle_video(&mut self) {
        let enabled = self.media.toggle_video();
        let local_id = self.options.user_id.clone();
        if self.tiles.set_track_enabled(&local_id, enabled) {
            self.options.on_tile_updated.emit(local_id);
            self.update_layout();
        }
    }

    fn cycle_camera(&mut self) -> Result<()> {
        match self.media.cycle() {
            Some(request) => {
                info!(
                    "switching camera to {} (generation {})",
                    request.device_id, request.generation
                );
                self.options.request_camera_switch.emit(request);
                Ok(())
            }
            None => Err(anyhow!("no alternate camera to switch to")),
        }
    }

    fn camera_switch_complete(&mut self, generation: u64, success: bool) {
        match self.media.complete_switch(generation, success) {
            SwitchResolution::Stale => {
                debug!("discarding stale camera-switch completion (generation {generation})");
            }
            SwitchResolution::Switched(device_id) => {
                info!("camera switched to {device_id}");
            }
            SwitchResolution::Failed => {
                error!("camera switch failed; local video degrades to off");
                if self.media.is_video_enabled() {
                    self.media.disable_video();
                    let local_id = self.options.user_id.clone();
                    if self.tiles.set_track_enabled(&local_id, false) {
                        self.options.on_tile_updated.emit(local_id);
                        self.update_layout();
                    }
                }
            }
        }
    }

    fn rotate_tile(&mut self, tile_id: &str) -> Result<()> {
        match self.tiles.get_mut(tile_id) {
            Some(tile) => {
                tile.rotate();
                self.options.on_tile_updated.emit(tile_id.to_string());
                Ok(())
            }
            None => Err(anyhow!("unknown tile {tile_id}")),
        }
    }

    fn tile_clicked(&mut self, tile_id: &str) -> Result<()> {
        if self.tiles.get(tile_id).is_none() {
            return Err(anyhow!("unknown tile {tile_id}"));
        }
        if self.tiles.click(tile_id) {
            self.options.on_tile_updated.emit(tile_id.to_string());
            self.update_layout();
        }
        Ok(())
    }

    /// Recomputes the shared style; publishes only actual changes so the
    /// embedder can apply every notification unconditionally.
    fn update_layout(&mut self) {
        let style = GridStyle::compute(self.viewport, self.tiles.eligible_count());
        if style != self.layout {
            self.layout = style;
            self.options.on_layout_changed.emit(style);
        }
    }

    fn emit_participant_count(&self) {
        self.options
            .on_participant_count_changed
            .emit(self.tiles.len());
    }
}

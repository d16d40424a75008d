use super::harness::{join, solo_client, test_client, SimChannel};
use crate::{Rotation, SessionStatus, TrackKind};

const EPSILON: f64 = 1e-9;

#[test]
fn connect_runs_the_external_handshake() {
    let (client, rec) = solo_client("LOCAL");
    assert_eq!(client.session_status(), SessionStatus::Disconnected);
    assert!(!client.is_connected());

    client.connect().unwrap();
    assert_eq!(rec.session_starts.get(), 1);
    assert_eq!(client.session_status(), SessionStatus::Connecting);
    // A second connect while the handshake runs is refused.
    assert!(client.connect().is_err());

    client.session_joined();
    assert!(client.is_connected());
    assert_eq!(rec.connected.get(), 1);
    // The side channel just came up: exactly one state query went out.
    assert_eq!(*rec.sent_frames.borrow(), vec!["state LOCAL".to_string()]);

    client.disconnect();
    assert_eq!(rec.session_ends.get(), 1);
    assert_eq!(client.session_status(), SessionStatus::Disconnected);
}

#[test]
fn join_failure_reverts_to_pre_join_with_one_notice() {
    let (client, rec) = solo_client("LOCAL");
    client.connect().unwrap();
    client.session_failed("token rejected".to_string());

    assert_eq!(*rec.lost.borrow(), vec!["token rejected".to_string()]);
    assert_eq!(client.session_status(), SessionStatus::Disconnected);
    assert_eq!(rec.connected.get(), 0);
    // Pre-join controls come back; a fresh connect is allowed.
    client.connect().unwrap();
    assert_eq!(rec.session_starts.get(), 2);
}

#[test]
fn mid_call_loss_clears_remotes_and_keeps_local() {
    let (client, rec) = solo_client("LOCAL");
    join(&client);
    client.on_participant_joined("PA1", "porch");
    client.on_participant_joined("PA2", "garage");
    assert_eq!(client.participant_count(), 3);

    client.session_failed("transport dropped".to_string());
    assert_eq!(client.tile_ids(), vec!["LOCAL"]);
    assert_eq!(client.participant_count(), 1);
    assert_eq!(rec.lost.borrow().len(), 1);
    // Stray failure reports while already disconnected stay silent.
    client.session_failed("echo".to_string());
    assert_eq!(rec.lost.borrow().len(), 1);
}

#[test]
fn participant_count_tracks_joins_leaves_and_disconnect() {
    let (client, rec) = solo_client("LOCAL");
    join(&client);
    client.on_participant_joined("PA1", "porch");
    client.on_participant_joined("PA2", "garage");
    client.on_participant_left("PA1");
    client.disconnect();
    assert_eq!(*rec.counts.borrow(), vec![2, 3, 2, 1]);
    assert_eq!(*rec.peers_removed.borrow(), vec!["PA1".to_string()]);
}

#[test]
fn track_events_racing_the_join_still_create_the_tile() {
    let (client, rec) = solo_client("LOCAL");
    join(&client);
    client.on_track_subscribed("PA7", TrackKind::Video);
    assert_eq!(*rec.peers_added.borrow(), vec!["PA7".to_string()]);
    // Until the join announcement lands, the id doubles as the label.
    assert_eq!(client.tile_view_model("PA7").unwrap().display_name, "PA7");

    client.on_participant_joined("PA7", "driveway");
    assert_eq!(client.tile_view_model("PA7").unwrap().display_name, "driveway");
    // No duplicate peer-added for the same id.
    assert_eq!(rec.peers_added.borrow().len(), 1);
}

#[test]
fn layout_follows_joins_leaves_and_resizes() {
    let (client, rec) = solo_client("LOCAL");
    join(&client);
    client.on_viewport_resize(1200.0, 800.0);

    // Local tile alone: height-limited single tile.
    let style = rec.last_layout();
    assert!((style.tile_height - 800.0).abs() < EPSILON);

    client.on_participant_joined("PA1", "porch");
    let style = rec.last_layout();
    assert!((style.tile_width - 600.0).abs() < EPSILON);
    assert!((style.tile_height - 450.0).abs() < EPSILON);

    for (id, name) in [("PA2", "garage"), ("PA3", "yard"), ("PA4", "hall")] {
        client.on_participant_joined(id, name);
    }
    // Five tiles in 1200x800 pack as two rows of three.
    let style = rec.last_layout();
    assert!((style.tile_width - 400.0).abs() < EPSILON);
    assert!((style.tile_height - 300.0).abs() < EPSILON);
    assert_eq!(client.layout_style(), style);

    // Hiding a track shrinks the eligible set and regrows the tiles: four
    // tiles pack as a height-capped two-by-two.
    client.on_track_enabled_changed("PA4", TrackKind::Video, false);
    assert_eq!(client.participant_count(), 5);
    let style = rec.last_layout();
    assert!((style.tile_width - 1600.0 / 3.0).abs() < 1e-6);
    assert!((style.tile_height - 400.0).abs() < 1e-6);
}

#[test]
fn unchanged_layouts_are_not_republished() {
    let (client, rec) = solo_client("LOCAL");
    join(&client);
    client.on_viewport_resize(1200.0, 800.0);
    let events = rec.layout_events();
    client.on_viewport_resize(1200.0, 800.0);
    assert_eq!(rec.layout_events(), events);
    // Audio-track notifications never touch the grid either.
    client.on_track_enabled_changed("LOCAL", TrackKind::Audio, false);
    assert_eq!(rec.layout_events(), events);
}

#[test]
fn toggling_local_video_removes_the_local_tile_from_the_grid() {
    let (client, rec) = solo_client("LOCAL");
    join(&client);
    client.on_viewport_resize(1200.0, 800.0);
    client.on_participant_joined("PA1", "porch");

    client.toggle_local_video();
    assert!(!client.tile_view_model("LOCAL").unwrap().visible);
    // One eligible tile left: the remote grows to the full height.
    assert!((rec.last_layout().tile_height - 800.0).abs() < EPSILON);

    client.toggle_local_video();
    assert!(client.tile_view_model("LOCAL").unwrap().visible);
    assert!((rec.last_layout().tile_height - 450.0).abs() < EPSILON);
}

#[test]
fn camera_cycling_is_fenced_against_stale_completions() {
    let (client, rec) = solo_client("LOCAL");
    join(&client);
    client.on_viewport_resize(1200.0, 800.0);

    // No roster yet: the control is unavailable.
    assert!(!client.can_cycle_camera());
    assert!(client.cycle_camera().is_err());

    client.set_video_devices(vec!["cam-a".to_string(), "cam-b".to_string()]);
    assert!(client.can_cycle_camera());
    client.cycle_camera().unwrap();
    let first = rec.camera_requests.borrow()[0].clone();
    assert_eq!(first.device_id, "cam-b");
    // In flight: the control is held down.
    assert!(!client.can_cycle_camera());

    client.camera_switch_complete(first.generation, true);
    assert!(client.can_cycle_camera());

    client.cycle_camera().unwrap();
    let second = rec.camera_requests.borrow()[1].clone();
    // The old completion shows up again: discarded, request still live.
    client.camera_switch_complete(first.generation, true);
    assert!(!client.can_cycle_camera());
    assert!(client.tile_view_model("LOCAL").unwrap().visible);

    // The live request fails: local video degrades to off, call continues.
    client.camera_switch_complete(second.generation, false);
    assert!(!client.tile_view_model("LOCAL").unwrap().visible);
    assert!(client.is_connected());
}

#[test]
fn rotation_cycles_without_touching_the_grid() {
    let (client, rec) = solo_client("LOCAL");
    join(&client);
    client.on_viewport_resize(1200.0, 800.0);
    client.on_participant_joined("PA1", "porch");
    let events = rec.layout_events();

    assert!(client.rotate_tile("nobody").is_err());
    client.rotate_tile("PA1").unwrap();
    assert_eq!(
        client.tile_view_model("PA1").unwrap().rotation,
        Rotation::Deg270
    );
    client.rotate_tile("PA1").unwrap();
    assert_eq!(
        client.tile_view_model("PA1").unwrap().rotation,
        Rotation::Deg180
    );
    // Rotation swaps rendered axes but allocates no new grid slot.
    assert_eq!(rec.layout_events(), events);
    let style = client.layout_style();
    assert_eq!(style.swapped().tile_width, style.tile_height);
}

#[test]
fn disconnect_preserves_local_media_state() {
    let channel = SimChannel::new();
    let (client, rec) = test_client("LOCAL", &channel, 0);
    join(&client);
    client.toggle_local_audio();
    assert!(client.tile_view_model("LOCAL").unwrap().audio_muted);

    client.disconnect();
    assert!(client.tile_view_model("LOCAL").unwrap().audio_muted);
    assert_eq!(rec.session_ends.get(), 1);

    // Next call starts with the mute carried over.
    join(&client);
    assert!(client.tile_view_model("LOCAL").unwrap().audio_muted);
}

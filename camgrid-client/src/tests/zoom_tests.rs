use super::harness::{join, solo_client};
use crate::TrackKind;

const EPSILON: f64 = 1e-9;

fn zoomed_tiles(client: &crate::CamGridClient) -> Vec<String> {
    client
        .tile_ids()
        .into_iter()
        .filter(|id| client.tile_view_model(id).unwrap().zoomed)
        .collect()
}

#[test]
fn clicking_focuses_one_tile_and_fills_the_viewport_with_it() {
    let (client, rec) = solo_client("LOCAL");
    join(&client);
    client.on_viewport_resize(1200.0, 800.0);
    client.on_participant_joined("PA1", "porch");
    client.on_participant_joined("PA2", "garage");

    client.on_tile_clicked("PA1").unwrap();
    assert_eq!(zoomed_tiles(&client), vec!["PA1"]);
    assert!(!client.tile_view_model("PA2").unwrap().visible);
    assert!(!client.tile_view_model("LOCAL").unwrap().visible);
    // One eligible tile: the zoomed one takes the full height.
    assert!((rec.last_layout().tile_height - 800.0).abs() < EPSILON);

    client.on_tile_clicked("PA1").unwrap();
    assert_eq!(zoomed_tiles(&client), Vec::<String>::new());
    for id in client.tile_ids() {
        assert!(client.tile_view_model(&id).unwrap().visible);
    }
}

#[test]
fn at_most_one_tile_is_ever_zoomed() {
    let (client, _rec) = solo_client("LOCAL");
    join(&client);
    client.on_viewport_resize(1200.0, 800.0);
    client.on_participant_joined("PA1", "porch");
    client.on_participant_joined("PA2", "garage");

    // An arbitrary click storm, including clicks the grid would not even
    // render a surface for.
    let clicks = [
        "PA1", "PA2", "LOCAL", "PA1", "PA1", "PA2", "PA2", "LOCAL", "PA2", "LOCAL",
    ];
    for id in clicks {
        client.on_tile_clicked(id).unwrap();
        assert!(zoomed_tiles(&client).len() <= 1, "after clicking {id}");
    }
    assert!(client.on_tile_clicked("nobody").is_err());
}

#[test]
fn departure_of_the_focused_participant_restores_the_grid() {
    let (client, rec) = solo_client("LOCAL");
    join(&client);
    client.on_viewport_resize(1200.0, 800.0);
    client.on_participant_joined("PA1", "porch");
    client.on_participant_joined("PA2", "garage");
    client.on_tile_clicked("PA2").unwrap();

    client.on_participant_left("PA2");
    assert_eq!(zoomed_tiles(&client), Vec::<String>::new());
    assert!(client.tile_view_model("PA1").unwrap().visible);
    assert!(client.tile_view_model("LOCAL").unwrap().visible);
    // Two survivors side by side again.
    assert!((rec.last_layout().tile_width - 600.0).abs() < EPSILON);
}

#[test]
fn join_and_reenable_under_zoom_stay_suppressed() {
    let (client, _rec) = solo_client("LOCAL");
    join(&client);
    client.on_viewport_resize(1200.0, 800.0);
    client.on_participant_joined("PA1", "porch");
    client.on_participant_joined("PA2", "garage");
    client.on_track_enabled_changed("PA2", TrackKind::Video, false);
    client.on_tile_clicked("PA1").unwrap();

    // Joins while the zoom holds do not break into the grid.
    client.on_participant_joined("PA3", "yard");
    assert!(!client.tile_view_model("PA3").unwrap().visible);

    // Re-enabling a hidden track under someone else's zoom keeps it off.
    client.on_track_enabled_changed("PA2", TrackKind::Video, true);
    assert!(!client.tile_view_model("PA2").unwrap().visible);
    assert_eq!(zoomed_tiles(&client), vec!["PA1"]);

    // Leaving zoom brings everyone back at once.
    client.on_tile_clicked("PA1").unwrap();
    assert!(client.tile_view_model("PA2").unwrap().visible);
    assert!(client.tile_view_model("PA3").unwrap().visible);
}

#[test]
fn unsubscribed_video_of_the_focused_tile_ends_the_zoom() {
    let (client, _rec) = solo_client("LOCAL");
    join(&client);
    client.on_viewport_resize(1200.0, 800.0);
    client.on_participant_joined("PA1", "porch");
    client.on_participant_joined("PA2", "garage");
    client.on_tile_clicked("PA1").unwrap();

    client.on_track_unsubscribed("PA1", TrackKind::Video);
    assert_eq!(zoomed_tiles(&client), Vec::<String>::new());
    // The tile record stays, hidden, until the participant leaves.
    assert_eq!(client.participant_count(), 3);
    assert!(!client.tile_view_model("PA1").unwrap().visible);
    assert!(client.tile_view_model("PA2").unwrap().visible);
    assert!(client.tile_view_model("LOCAL").unwrap().visible);
}

#[test]
fn disabling_the_focused_track_empties_the_grid_but_keeps_the_zoom() {
    let (client, rec) = solo_client("LOCAL");
    join(&client);
    client.on_viewport_resize(1200.0, 800.0);
    client.on_participant_joined("PA1", "porch");
    client.on_tile_clicked("PA1").unwrap();

    client.on_track_enabled_changed("PA1", TrackKind::Video, false);
    // Nothing eligible: the shared style collapses.
    assert_eq!(rec.last_layout(), crate::GridStyle::default());
    // The focus itself survives until the owner re-enables or leaves.
    client.on_track_enabled_changed("PA1", TrackKind::Video, true);
    assert_eq!(zoomed_tiles(&client), vec!["PA1"]);
    assert!(!client.tile_view_model("LOCAL").unwrap().visible);
}

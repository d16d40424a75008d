// Camera frames are packed at a fixed 4:3 (width/height) ratio; the grid never
// letterboxes individual tiles.
pub const TILE_ASPECT_RATIO: f64 = 4.0 / 3.0;

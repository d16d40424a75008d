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

//! Uniform sizing for the participant grid.
//!
//! Every visible tile in a call renders at the same size, so the whole grid is
//! described by a single [GridStyle] that the embedding UI applies as one
//! shared style rule. The engine is a pure function of the viewport and the
//! number of eligible tiles; it owns no state and is cheap enough to rerun on
//! every resize, join/leave, or visibility flip.

use crate::constants::TILE_ASPECT_RATIO;
use serde::{Deserialize, Serialize};

/// The area tiles may occupy, in CSS pixels. Read-only input; it changes only
/// when the embedder reports a resize.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The shared tile dimensions for the current grid, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridStyle {
    pub tile_width: f64,
    pub tile_height: f64,
}

impl GridStyle {
    /// Computes the style for `eligible_count` tiles in `viewport`.
    ///
    /// With zero eligible tiles there is nothing to size and the style
    /// collapses to zero dimensions.
    pub fn compute(viewport: Viewport, eligible_count: usize) -> Self {
        match best_packing(viewport.width, viewport.height, eligible_count) {
            Some(packing) => Self {
                tile_width: packing.tile_width,
                tile_height: packing.tile_height,
            },
            None => Self::default(),
        }
    }

    /// Dimensions with the axes exchanged, for rendering the content of a tile
    /// rotated 90° or 270°. The grid slot itself keeps the unswapped size.
    pub fn swapped(&self) -> Self {
        Self {
            tile_width: self.tile_height,
            tile_height: self.tile_width,
        }
    }
}

/// One row-count candidate: `rows` rows of `columns` columns, with the largest
/// tile dimensions that keep the whole arrangement inside the viewport.
#[derive(Clone, Copy, Debug)]
struct Packing {
    rows: usize,
    columns: usize,
    tile_width: f64,
    tile_height: f64,
}

impl Packing {
    fn area(&self) -> f64 {
        self.tile_width * self.tile_height
    }
}

/// Returns the largest tile width at the fixed aspect ratio such that
/// `eligible_count` tiles fit in the viewport without overflow or scrolling.
///
/// The result is unspecified-but-harmless (zero) for an empty grid; callers
/// with no tiles have nothing to apply it to.
pub fn compute_tile_width(viewport_width: f64, viewport_height: f64, eligible_count: usize) -> f64 {
    best_packing(viewport_width, viewport_height, eligible_count)
        .map(|packing| packing.tile_width)
        .unwrap_or(0.0)
}

/// Tries every row count from 1 to `eligible_count` and keeps the candidate
/// with the largest tile area. The comparison is strictly greater-than: on an
/// exact area tie the earlier (lower) row count wins, which pins the packing
/// chosen for viewports where two arrangements are equally good.
fn best_packing(
    viewport_width: f64,
    viewport_height: f64,
    eligible_count: usize,
) -> Option<Packing> {
    let mut best: Option<Packing> = None;
    for rows in 1..=eligible_count {
        let columns = (eligible_count as f64 / rows as f64).ceil();
        let row_height = viewport_height / rows as f64;

        let mut tile_width = viewport_width / columns;
        let mut tile_height = tile_width / TILE_ASPECT_RATIO;
        if tile_height > row_height {
            tile_height = row_height;
            tile_width = TILE_ASPECT_RATIO * tile_height;
        }

        let candidate = Packing {
            rows,
            columns: columns as usize,
            tile_width,
            tile_height,
        };
        let improves = match &best {
            Some(current) => candidate.area() > current.area(),
            None => true,
        };
        if improves {
            best = Some(candidate);
        }
    }
    best
}

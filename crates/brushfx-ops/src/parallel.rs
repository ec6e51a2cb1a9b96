//! Rayon-backed variants of bulk operations.
//!
//! The per-pixel code is the same as the serial path; only the iteration is
//! split by destination rows. Each worker owns a disjoint row of the output
//! and reads inputs immutably, so no locking is involved.
//!
//! # Example
//!
//! ```rust
//! use brushfx_core::{AlphaMode, Bgra, Surface};
//! use brushfx_ops::parallel;
//!
//! let s = Surface::filled(64, 64, Bgra::WHITE, AlphaMode::Premultiplied);
//! let counts = parallel::count_colors(&s);
//! assert_eq!(counts[&Bgra::WHITE], 64 * 64);
//! ```

use std::collections::HashMap;

use brushfx_core::{Bgra, Rect, Surface};
use rayon::prelude::*;
use tracing::trace;

use crate::OpsResult;
use crate::composite::{LayerMerge, prepare};

/// Parallel [`crate::composite::merge`]; output is pixel-identical.
///
/// # Errors
///
/// Same as [`crate::composite::merge`].
pub fn merge(
    staged: &Surface,
    committed: &Surface,
    dest: &mut Surface,
    region: Rect,
    params: &LayerMerge<'_>,
) -> OpsResult<()> {
    let Some(rect) = prepare(staged, committed, Some(&*dest), region)? else {
        return Ok(());
    };
    trace!(%rect, max_opacity = params.max_opacity, "parallel merge");

    let stride = dest.stride();
    let row_bytes = dest.width() as usize * 4;
    let x0 = rect.x as usize;
    let cols = x0..x0 + rect.width as usize;
    let y0 = rect.y as usize;
    let y1 = y0 + rect.height as usize;

    dest.data_mut()[y0 * stride..y1 * stride]
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(i, chunk)| {
            let y = (y0 + i) as u32;
            let out: &mut [Bgra] = bytemuck::cast_slice_mut(&mut chunk[..row_bytes]);
            params.row(
                &staged.row(y)[cols.clone()],
                &committed.row(y)[cols.clone()],
                &mut out[cols.clone()],
            );
        });
    Ok(())
}

/// Counts how often each pixel value occurs.
///
/// Rows are counted into per-worker maps that are merged by reduction.
pub fn count_colors(surface: &Surface) -> HashMap<Bgra, u64> {
    trace!(w = surface.width(), h = surface.height(), "parallel count_colors");
    (0..surface.height())
        .into_par_iter()
        .fold(HashMap::new, |mut counts, y| {
            for p in surface.row(y) {
                *counts.entry(*p).or_insert(0u64) += 1;
            }
            counts
        })
        .reduce(HashMap::new, |a, b| {
            // fold the smaller map into the larger one
            if a.len() >= b.len() {
                merge_counts(a, b)
            } else {
                merge_counts(b, a)
            }
        })
}

fn merge_counts(mut into: HashMap<Bgra, u64>, from: HashMap<Bgra, u64>) -> HashMap<Bgra, u64> {
    for (color, n) in from {
        *into.entry(color).or_insert(0) += n;
    }
    into
}

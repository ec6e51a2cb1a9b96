//! Staged-to-committed layer merge.
//!
//! While a stroke is in progress its pixels accumulate in a *staged*
//! surface. After each input point the staged surface is merged over the
//! *committed* surface (the image before the stroke) into the visible
//! destination.
//!
//! The staged alpha is first capped by `max_opacity`, so a stroke can never
//! become more opaque than the brush opacity setting no matter how many
//! stamps overlap. Then either:
//!
//! - **Normal**: ink buildup, the same rule as a Normal brush draw:
//!   `out.a = min(1, capped + committed.a)`, color is staged over committed.
//! - **Named**: the [`BlendOp`] gets the straight committed color and the
//!   straight staged color carrying the capped alpha.
//!
//! A capped alpha of zero always reproduces the committed pixel exactly.
//!
//! # Aliasing
//!
//! The destination may be one of the inputs. [`merge`] writes to a third
//! surface, [`merge_into_committed`] and [`merge_into_staged`] write over
//! one of the inputs. All three run [`LayerMerge::pixel`], which reads both
//! inputs before producing the output.

use brushfx_core::{Bgra, Rect, Surface};
use tracing::{debug, trace};

use crate::blend::BlendOp;
use crate::channels::{color_unit, weighted_mix};
use crate::{OpsError, OpsResult};

/// Per-call merge settings.
#[derive(Debug, Clone, Copy)]
pub struct LayerMerge<'a> {
    /// Cap on the staged alpha
    pub max_opacity: u8,
    /// Named operation; `None` is Normal
    pub blend: Option<&'a dyn BlendOp>,
}

impl<'a> LayerMerge<'a> {
    /// Normal merge with the given opacity cap.
    pub fn normal(max_opacity: u8) -> Self {
        Self {
            max_opacity,
            blend: None,
        }
    }

    /// Merge through a named operation.
    pub fn with_blend(max_opacity: u8, blend: &'a dyn BlendOp) -> Self {
        Self {
            max_opacity,
            blend: Some(blend),
        }
    }

    /// Merges one premultiplied staged pixel over one premultiplied
    /// committed pixel.
    #[inline]
    pub fn pixel(&self, staged: Bgra, committed: Bgra) -> Bgra {
        let capped = staged.a.min(self.max_opacity);
        if capped == 0 {
            return committed;
        }
        let s = staged.to_straight();
        let c = committed.to_straight();

        match self.blend {
            Some(op) => op.apply(c, s.with_alpha(capped)).to_premultiplied(),
            None => {
                let sa = capped as f32 / 255.0;
                let ca = c.a as f32 / 255.0;
                let alpha = (sa + ca).min(1.0);
                let color = weighted_mix(color_unit(c), ca, color_unit(s), 1.0, sa);
                Bgra::from_unit([color[0], color[1], color[2], 1.0])
                    .with_alpha(brushfx_core::unit_to_byte(alpha))
                    .to_premultiplied()
            }
        }
    }

    /// Merges one row slice pairwise into `out`.
    #[inline]
    pub fn row(&self, staged: &[Bgra], committed: &[Bgra], out: &mut [Bgra]) {
        for ((o, s), c) in out.iter_mut().zip(staged).zip(committed) {
            *o = self.pixel(*s, *c);
        }
    }
}

/// Checks sizes and alpha modes, and clips `region` to the surfaces.
///
/// Returns `None` when the clipped region is empty.
pub(crate) fn prepare(
    staged: &Surface,
    committed: &Surface,
    dest: Option<&Surface>,
    region: Rect,
) -> OpsResult<Option<Rect>> {
    if !staged.same_size(committed) {
        return Err(OpsError::size_mismatch("staged/committed", staged, committed));
    }
    staged.ensure_premultiplied("staged")?;
    committed.ensure_premultiplied("committed")?;
    if let Some(dest) = dest {
        if !dest.same_size(committed) {
            return Err(OpsError::size_mismatch("destination/committed", dest, committed));
        }
        dest.ensure_premultiplied("destination")?;
    }

    let clipped = region.clamp_to(committed.width(), committed.height());
    if clipped.is_none() {
        debug!(%region, "merge: region outside surfaces");
    }
    Ok(clipped)
}

#[inline]
fn columns(rect: &Rect) -> std::ops::Range<usize> {
    rect.x as usize..rect.x as usize + rect.width as usize
}

#[inline]
fn rows(rect: &Rect) -> std::ops::Range<u32> {
    rect.y as u32..rect.y as u32 + rect.height
}

/// Merges `staged` over `committed` into `dest` within `region`.
///
/// Pixels of `dest` outside `region` are left alone.
///
/// # Errors
///
/// - [`OpsError::SizeMismatch`] if the three surfaces differ in size
/// - [`OpsError::Core`] if any of them is not premultiplied
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
    trace!(%rect, max_opacity = params.max_opacity, blend = ?params.blend, "merge");

    let cols = columns(&rect);
    for y in rows(&rect) {
        params.row(
            &staged.row(y)[cols.clone()],
            &committed.row(y)[cols.clone()],
            &mut dest.row_mut(y)[cols.clone()],
        );
    }
    Ok(())
}

/// Merges `staged` over `committed`, writing the result into `committed`.
///
/// # Errors
///
/// Same as [`merge`].
pub fn merge_into_committed(
    staged: &Surface,
    committed: &mut Surface,
    region: Rect,
    params: &LayerMerge<'_>,
) -> OpsResult<()> {
    let Some(rect) = prepare(staged, committed, None, region)? else {
        return Ok(());
    };
    trace!(%rect, max_opacity = params.max_opacity, "merge into committed");

    let cols = columns(&rect);
    for y in rows(&rect) {
        let s = &staged.row(y)[cols.clone()];
        for (c, s) in committed.row_mut(y)[cols.clone()].iter_mut().zip(s) {
            *c = params.pixel(*s, *c);
        }
    }
    Ok(())
}

/// Merges `staged` over `committed`, writing the result into `staged`.
///
/// # Errors
///
/// Same as [`merge`].
pub fn merge_into_staged(
    staged: &mut Surface,
    committed: &Surface,
    region: Rect,
    params: &LayerMerge<'_>,
) -> OpsResult<()> {
    let Some(rect) = prepare(staged, committed, None, region)? else {
        return Ok(());
    };
    trace!(%rect, max_opacity = params.max_opacity, "merge into staged");

    let cols = columns(&rect);
    for y in rows(&rect) {
        let c = &committed.row(y)[cols.clone()];
        for (s, c) in staged.row_mut(y)[cols.clone()].iter_mut().zip(c) {
            *s = params.pixel(*s, *c);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::{BlendRegistry, MergeBlend};
    use brushfx_core::AlphaMode;

    const BLUE: Bgra = Bgra::new(255, 0, 0, 255);

    fn layers() -> (Surface, Surface) {
        let mut staged = Surface::new(4, 4, AlphaMode::Premultiplied);
        let mut committed = Surface::new(4, 4, AlphaMode::Premultiplied);
        for (x, y, _) in Surface::new(4, 4, AlphaMode::Premultiplied).pixels() {
            let a = (x * 60 + y * 10) as u8;
            staged.set_pixel(x, y, Bgra::new(a, a / 2, 0, a));
            committed.set_pixel(x, y, Bgra::new(0, 100, 200, 200 + (y as u8) * 10));
        }
        (staged, committed)
    }

    #[test]
    fn test_zero_opacity_is_committed() {
        let (staged, committed) = layers();
        let mut dest = Surface::filled(4, 4, Bgra::WHITE, AlphaMode::Premultiplied);
        merge(&staged, &committed, &mut dest, committed.bounds(), &LayerMerge::normal(0)).unwrap();
        assert_eq!(dest, committed);

        let multiply = LayerMerge::with_blend(0, &MergeBlend::Multiply);
        let mut dest = Surface::new(4, 4, AlphaMode::Premultiplied);
        merge(&staged, &committed, &mut dest, committed.bounds(), &multiply).unwrap();
        assert_eq!(dest, committed);
    }

    #[test]
    fn test_normal_over_transparent() {
        let staged = Surface::filled(2, 2, BLUE, AlphaMode::Premultiplied);
        let committed = Surface::new(2, 2, AlphaMode::Premultiplied);
        let mut dest = Surface::new(2, 2, AlphaMode::Premultiplied);
        merge(&staged, &committed, &mut dest, staged.bounds(), &LayerMerge::normal(255)).unwrap();
        assert_eq!(dest, staged);
    }

    #[test]
    fn test_opacity_cap() {
        let staged = Surface::filled(1, 1, BLUE, AlphaMode::Premultiplied);
        let committed = Surface::new(1, 1, AlphaMode::Premultiplied);
        let mut dest = Surface::new(1, 1, AlphaMode::Premultiplied);
        merge(&staged, &committed, &mut dest, staged.bounds(), &LayerMerge::normal(100)).unwrap();
        assert_eq!(dest.pixel(0, 0), Bgra::new(100, 0, 0, 100));
    }

    #[test]
    fn test_normal_alpha_is_additive() {
        let staged = Surface::filled(1, 1, Bgra::new(100, 0, 0, 100), AlphaMode::Premultiplied);
        let committed = Surface::filled(1, 1, Bgra::new(0, 0, 100, 100), AlphaMode::Premultiplied);
        let merged = LayerMerge::normal(255).pixel(staged.pixel(0, 0), committed.pixel(0, 0));
        assert_eq!(merged.a, 200);
        assert!(merged.is_valid_premultiplied());
    }

    #[test]
    fn test_named_blend() {
        let gray = |v: u8| Bgra::new(v, v, v, 255);
        let staged = Surface::filled(1, 1, gray(128), AlphaMode::Premultiplied);
        let committed = Surface::filled(1, 1, gray(200), AlphaMode::Premultiplied);
        let mut dest = Surface::new(1, 1, AlphaMode::Premultiplied);
        let op = BlendRegistry::global().require("multiply").unwrap();
        let params = LayerMerge::with_blend(255, op);
        merge(&staged, &committed, &mut dest, staged.bounds(), &params).unwrap();
        assert_eq!(dest.pixel(0, 0), gray(100));
    }

    #[test]
    fn test_in_place_variants_match() {
        let (staged, committed) = layers();
        let params = LayerMerge::normal(180);
        let mut expected = Surface::new(4, 4, AlphaMode::Premultiplied);
        merge(&staged, &committed, &mut expected, committed.bounds(), &params).unwrap();

        let mut into_committed = committed.clone();
        merge_into_committed(&staged, &mut into_committed, committed.bounds(), &params).unwrap();
        assert_eq!(into_committed, expected);

        let mut into_staged = staged.clone();
        merge_into_staged(&mut into_staged, &committed, committed.bounds(), &params).unwrap();
        assert_eq!(into_staged, expected);
    }

    #[test]
    fn test_region_is_clipped() {
        let (staged, committed) = layers();
        let mut dest = Surface::new(4, 4, AlphaMode::Premultiplied);
        let region = Rect::new(-2, 2, 4, 10);
        merge(&staged, &committed, &mut dest, region, &LayerMerge::normal(255)).unwrap();
        for (x, y, p) in dest.pixels() {
            if x < 2 && y >= 2 {
                let want = LayerMerge::normal(255).pixel(staged.pixel(x, y), committed.pixel(x, y));
                assert_eq!(p, want);
            } else {
                assert_eq!(p, Bgra::TRANSPARENT);
            }
        }
        // Entirely outside: nothing happens.
        let outside = Rect::new(10, 10, 2, 2);
        merge(&staged, &committed, &mut dest, outside, &LayerMerge::normal(255)).unwrap();
    }

    #[test]
    fn test_size_and_mode_checks() {
        let staged = Surface::new(2, 2, AlphaMode::Premultiplied);
        let committed = Surface::new(3, 2, AlphaMode::Premultiplied);
        let mut dest = Surface::new(2, 2, AlphaMode::Premultiplied);
        let err = merge(&staged, &committed, &mut dest, staged.bounds(), &LayerMerge::normal(255));
        assert!(matches!(err, Err(OpsError::SizeMismatch(_))));

        let committed = Surface::new(2, 2, AlphaMode::Straight);
        let err = merge(&staged, &committed, &mut dest, staged.bounds(), &LayerMerge::normal(255));
        assert!(matches!(err, Err(OpsError::Core(_))));
    }
}

//! Integration tests for brushfx crates.
//!
//! This crate contains end-to-end tests that run whole stamp and merge
//! sequences across `brushfx-core` and `brushfx-ops`, plus a few fixture
//! helpers shared by those tests.

use brushfx_core::{AlphaMode, Bgra, Rect, Surface};
use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber for test output.
///
/// Honours `RUST_LOG`, defaults to `info`. Safe to call from every test;
/// only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// A premultiplied surface where neighbouring pixels differ in every
/// channel.
pub fn patterned(width: u32, height: u32, seed: u32) -> Surface {
    let mut s = Surface::new(width, height, AlphaMode::Premultiplied);
    for y in 0..height {
        for x in 0..width {
            let n = x.wrapping_mul(37) ^ y.wrapping_mul(101) ^ seed;
            let a = 64 + (n % 192) as u8;
            let straight = Bgra::new((n * 3) as u8, (n * 7 + 11) as u8, (n * 13 + 5) as u8, a);
            s.set_pixel(x, y, straight.to_premultiplied());
        }
    }
    s
}

/// Copies `rect` (which must lie inside `src`) into a new surface.
pub fn crop(src: &Surface, rect: Rect) -> Surface {
    let mut out = Surface::new(rect.width, rect.height, src.alpha_mode());
    let x0 = rect.x as usize;
    for (y, row) in out.rows_mut() {
        row.copy_from_slice(&src.row(rect.y as u32 + y)[x0..x0 + rect.width as usize]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use brushfx_core::{
        BrushBlendMode, ChannelLocks, ColorInfluence, Hsv, Point, StampOptions, UserColor,
    };
    use brushfx_ops::composite::{self, LayerMerge};
    use brushfx_ops::draw::draw;
    use brushfx_ops::overwrite::overwrite;
    use brushfx_ops::resample::{Interpolation, ScaleOptions, scale};
    use brushfx_ops::{BlendRegistry, ColorMatrix, MergeBlend, dither_keeps};

    const BLUE: Bgra = Bgra::new(255, 0, 0, 255);
    const GREEN: Bgra = Bgra::new(0, 255, 0, 255);
    const RED: Bgra = Bgra::new(0, 0, 255, 255);

    fn single_locks() -> Vec<(&'static str, ChannelLocks)> {
        let none = ChannelLocks::NONE;
        vec![
            ("a", ChannelLocks { a: true, ..none }),
            ("r", ChannelLocks { r: true, ..none }),
            ("g", ChannelLocks { g: true, ..none }),
            ("b", ChannelLocks { b: true, ..none }),
            ("rg", ChannelLocks { r: true, g: true, ..none }),
            ("ab", ChannelLocks { a: true, b: true, ..none }),
        ]
    }

    fn channel(p: Bgra, name: char) -> u8 {
        match name {
            'a' => p.a,
            'r' => p.r,
            'g' => p.g,
            'b' => p.b,
            _ => unreachable!(),
        }
    }

    /// Premultiply round-trip stays within one step for every valid pixel.
    #[test]
    fn test_premultiply_roundtrip() {
        for a in 1..=255u8 {
            for c in (0..=a).step_by(3) {
                let p = Bgra::new(c, a - c, c / 2, a);
                let back = p.to_straight().to_premultiplied();
                for (x, y) in [(p.b, back.b), (p.g, back.g), (p.r, back.r)] {
                    assert!((x as i16 - y as i16).abs() <= 1, "{p:?} -> {back:?}");
                }
                assert_eq!(back.a, a);
            }
        }
    }

    /// HSV round-trip is exact over the whole RGB cube.
    #[test]
    fn test_hsv_roundtrip_full_cube() {
        for r in 0..=255u8 {
            for g in 0..=255u8 {
                for b in 0..=255u8 {
                    let c = Bgra::new(b, g, r, 255);
                    let back = Hsv::from_bgra(c).to_bgra(255);
                    assert_eq!(back, c);
                }
            }
        }
    }

    #[test]
    fn test_channel_lock_invariance() {
        init_tracing();
        let original = patterned(12, 9, 3);
        let mask = {
            let mut m = patterned(7, 7, 99);
            m.set_pixel(3, 3, Bgra::WHITE);
            m
        };
        let source = patterned(12, 9, 41);
        let user = UserColor::new(Bgra::new(30, 200, 90, 220), 40);
        let influence = ColorInfluence::new(60, true, true, true);
        let location = Point::new(-2, 4);

        for (names, locks) in single_locks() {
            for wrap in [false, true] {
                for mode in BrushBlendMode::ALL {
                    let opts = StampOptions::default()
                        .with_mode(mode)
                        .with_locks(locks)
                        .with_wrap(wrap);

                    let mut drawn = original.clone();
                    draw(&mut drawn, &mask, location, &user, None, &opts).unwrap();
                    let mut influenced = original.clone();
                    draw(&mut influenced, &mask, location, &user, Some(&influence), &opts).unwrap();
                    let mut replaced = original.clone();
                    overwrite(&source, &mut replaced, &mask, location, &opts).unwrap();

                    for result in [&drawn, &influenced, &replaced] {
                        assert_ne!(result, &original, "locks {names} changed nothing");
                        for (x, y, p) in result.pixels() {
                            let before = original.pixel(x, y);
                            for ch in names.chars() {
                                assert_eq!(
                                    channel(p, ch),
                                    channel(before, ch),
                                    "channel {ch} changed at ({x}, {y}), mode {mode:?}, wrap {wrap}"
                                );
                            }
                            assert!(p.is_valid_premultiplied());
                        }
                    }
                }
            }
        }
    }

    /// Opaque, well-saturated colors in a 60 degree hue band, so mixes of
    /// two of them stay far from gray and their hue is well defined.
    fn saturated(width: u32, height: u32, seed: u32) -> Surface {
        let mut s = Surface::new(width, height, AlphaMode::Premultiplied);
        for y in 0..height {
            for x in 0..width {
                let n = x.wrapping_mul(37) ^ y.wrapping_mul(101) ^ seed;
                let hsv = Hsv::new(
                    180.0 + (n % 60) as f32,
                    0.5 + (n % 50) as f32 / 100.0,
                    0.7 + (n % 30) as f32 / 100.0,
                );
                s.set_pixel(x, y, hsv.to_bgra(255));
            }
        }
        s
    }

    #[test]
    fn test_hsv_lock_invariance() {
        let original = saturated(12, 9, 3);
        let source = saturated(12, 9, 41);
        let mask = patterned(7, 7, 99);
        let user = UserColor::new(Hsv::new(215.0, 0.9, 0.95).to_bgra(255), 0);
        let location = Point::new(-2, 4);
        let none = ChannelLocks::NONE;

        for (name, locks) in [
            ("h", ChannelLocks { h: true, ..none }),
            ("s", ChannelLocks { s: true, ..none }),
            ("v", ChannelLocks { v: true, ..none }),
        ] {
            for mode in BrushBlendMode::ALL {
                let opts = StampOptions::default()
                    .with_mode(mode)
                    .with_locks(locks)
                    .with_wrap(true);

                let mut drawn = original.clone();
                draw(&mut drawn, &mask, location, &user, None, &opts).unwrap();
                let mut replaced = original.clone();
                overwrite(&source, &mut replaced, &mask, location, &opts).unwrap();

                for result in [&drawn, &replaced] {
                    assert_ne!(result, &original, "lock {name} changed nothing");
                    for (x, y, p) in result.pixels() {
                        assert_eq!(p.a, 255);
                        let before = Hsv::from_bgra(original.pixel(x, y));
                        let after = Hsv::from_bgra(p);
                        let at = format!("lock {name} at ({x}, {y}), mode {mode:?}");
                        match name {
                            "h" => {
                                let d = (after.h - before.h).abs();
                                let (was, now) = (before.h, after.h);
                                assert!(d.min(360.0 - d) < 1.5, "{at}: hue {now} vs {was}");
                            }
                            "s" => assert_abs_diff_eq!(after.s, before.s, epsilon = 0.02),
                            _ => assert_abs_diff_eq!(after.v, before.v, epsilon = 0.005),
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_merge_zero_opacity_identity() {
        let staged = patterned(10, 10, 1);
        let committed = patterned(10, 10, 2);
        let region = Rect::new(2, 1, 6, 8);

        let mut dest = patterned(10, 10, 3);
        composite::merge(&staged, &committed, &mut dest, region, &LayerMerge::normal(0)).unwrap();
        assert_eq!(crop(&dest, region), crop(&committed, region));

        for op in MergeBlend::ALL {
            let mut dest = committed.clone();
            let params = LayerMerge::with_blend(0, &op);
            composite::merge_into_committed(&staged, &mut dest, region, &params).unwrap();
            assert_eq!(dest, committed, "{op}");
        }
    }

    #[test]
    fn test_wrap_symmetry_left_edge() {
        let canvas = patterned(16, 12, 7);
        let mask = patterned(6, 5, 8);
        let user = UserColor::new(Bgra::new(10, 240, 120, 255), 0);
        let neg_x = 2;
        let location = Point::new(-neg_x, 3);

        for dither in [false, true] {
            for mode in BrushBlendMode::ALL {
                let wrapped_opts = StampOptions::default()
                    .with_mode(mode)
                    .with_wrap(true)
                    .with_dither(dither);
                let mut wrapped = canvas.clone();
                draw(&mut wrapped, &mask, location, &user, None, &wrapped_opts).unwrap();

                // The clipped columns drawn directly where they wrap to.
                let clipped = crop(&mask, Rect::new(0, 0, neg_x as u32, 5));
                let direct_opts = wrapped_opts.with_wrap(false);
                let mut direct = canvas.clone();
                let at = Point::new(16 - neg_x, 3);
                draw(&mut direct, &clipped, at, &user, None, &direct_opts).unwrap();

                let right_edge = Rect::new(16 - neg_x, 0, neg_x as u32, 12);
                assert_eq!(crop(&wrapped, right_edge), crop(&direct, right_edge));
            }
        }
    }

    #[test]
    fn test_wrap_symmetry_corner() {
        let canvas = Surface::new(10, 10, AlphaMode::Premultiplied);
        let mask = patterned(4, 4, 5);
        let user = UserColor::new(RED, 0);
        let opts = StampOptions::default().with_wrap(true);

        let mut wrapped = canvas.clone();
        draw(&mut wrapped, &mask, Point::new(8, 8), &user, None, &opts).unwrap();

        // Same stamp as four unwrapped quarter draws.
        let mut direct = canvas.clone();
        let plain = opts.with_wrap(false);
        for (sx, sy, dx, dy) in [(0, 0, 8, 8), (2, 0, 0, 8), (0, 2, 8, 0), (2, 2, 0, 0)] {
            let part = crop(&mask, Rect::new(sx, sy, 2, 2));
            draw(&mut direct, &part, Point::new(dx, dy), &user, None, &plain).unwrap();
        }
        assert_eq!(wrapped, direct);
    }

    #[test]
    fn test_dither_parity() {
        let original = Surface::filled(9, 7, GREEN, AlphaMode::Premultiplied);
        let mask = Surface::filled(5, 5, Bgra::WHITE, AlphaMode::Straight);
        let user = UserColor::new(BLUE, 0);
        let location = Point::new(-1, 3);
        let covered = Rect::new(0, 3, 4, 4);
        let opts = StampOptions::default().with_dither(true);

        let mut dest = original.clone();
        draw(&mut dest, &mask, location, &user, None, &opts).unwrap();
        for (x, y, p) in dest.pixels() {
            let inside = covered.contains(x as i32, y as i32);
            if inside && dither_keeps(x, y) {
                assert_eq!(p, BLUE, "({x}, {y}) should be drawn");
            } else {
                assert_eq!(p, GREEN, "({x}, {y}) should be untouched");
            }
        }

        // Overwrite follows the same checkerboard.
        let source = Surface::filled(9, 7, RED, AlphaMode::Premultiplied);
        let mut dest = original.clone();
        overwrite(&source, &mut dest, &mask, location, &opts).unwrap();
        for (x, y, p) in dest.pixels() {
            let hit = covered.contains(x as i32, y as i32) && dither_keeps(x, y);
            let expected = if hit { RED } else { GREEN };
            assert_eq!(p, expected);
        }
    }

    #[test]
    fn test_normal_blue_scenario() {
        let mut dest = Surface::new(4, 4, AlphaMode::Premultiplied);
        let mask = Surface::filled(4, 4, RED, AlphaMode::Straight);
        let opts = StampOptions::default().with_mode(BrushBlendMode::Normal);
        draw(&mut dest, &mask, Point::ZERO, &UserColor::new(BLUE, 0), None, &opts).unwrap();
        assert_eq!(dest, Surface::filled(4, 4, BLUE, AlphaMode::Premultiplied));
    }

    #[test]
    fn test_overwrite_mode_scenario() {
        let mut dest = Surface::filled(4, 4, GREEN, AlphaMode::Premultiplied);
        let mask = Surface::filled(4, 4, RED, AlphaMode::Straight);
        let opts = StampOptions::default().with_mode(BrushBlendMode::Overwrite);
        draw(&mut dest, &mask, Point::ZERO, &UserColor::new(BLUE, 0), None, &opts).unwrap();
        assert_eq!(dest, Surface::filled(4, 4, BLUE, AlphaMode::Premultiplied));
    }

    #[test]
    fn test_stroke_pipeline() {
        init_tracing();
        let committed = patterned(48, 32, 11);
        let mut staged = Surface::new(48, 32, AlphaMode::Premultiplied);

        // A soft round-ish brush, tinted and scaled down.
        let mut brush = Surface::new(16, 16, AlphaMode::Straight);
        for y in 0..16 {
            for x in 0..16 {
                let dx = x as f32 - 7.5;
                let dy = y as f32 - 7.5;
                let a = (255.0 * (1.0 - (dx * dx + dy * dy).sqrt() / 8.0)).max(0.0) as u8;
                brush.set_pixel(x, y, Bgra::new(255, 255, 255, a));
            }
        }
        let stamp_opts = ScaleOptions::default()
            .with_interpolation(Interpolation::Bicubic)
            .with_color_matrix(ColorMatrix::tint(RED, 0.8));
        let stamp = scale(&brush, 8, 8, &stamp_opts);

        let user = UserColor::new(RED, 0);
        let opts = StampOptions::default().with_wrap(true);
        for i in 0..12 {
            let p = Point::new(-4 + i * 5, 20 - i * 3);
            draw(&mut staged, &stamp, p, &user, None, &opts).unwrap();
        }
        let touched = staged.pixels().filter(|(_, _, p)| p.a > 0).count();
        tracing::debug!(touched, "stroke staged");
        assert!(touched > 0);

        let screen = BlendRegistry::global().require("screen").unwrap();
        let params = LayerMerge::with_blend(200, screen);
        let mut serial = committed.clone();
        composite::merge(&staged, &committed, &mut serial, committed.bounds(), &params).unwrap();

        let mut parallel = committed.clone();
        let region = committed.bounds();
        brushfx_ops::parallel::merge(&staged, &committed, &mut parallel, region, &params).unwrap();
        assert_eq!(serial, parallel);

        let mut in_place = staged.clone();
        composite::merge_into_staged(&mut in_place, &committed, region, &params).unwrap();
        assert_eq!(in_place, serial);
        assert!(serial.pixels().all(|(_, _, p)| p.is_valid_premultiplied()));
    }

    #[test]
    fn test_influence_pulls_hue_toward_user() {
        // Green brush pulled halfway toward red goes through yellow.
        let mut dest = Surface::new(1, 1, AlphaMode::Premultiplied);
        let mask = Surface::filled(1, 1, GREEN, AlphaMode::Straight);
        let user = UserColor::new(RED, 0);
        let influence = ColorInfluence::new(50, true, false, false);
        let opts = StampOptions::default();
        draw(&mut dest, &mask, Point::ZERO, &user, Some(&influence), &opts).unwrap();

        let hsv = Hsv::from_bgra(dest.straight_pixel(0, 0));
        assert_abs_diff_eq!(hsv.h, 60.0, epsilon = 1.0);
        assert_abs_diff_eq!(hsv.s, 1.0, epsilon = 0.01);
        assert_abs_diff_eq!(hsv.v, 1.0, epsilon = 0.01);
    }

    #[test]
    fn test_settings_serde_roundtrip() {
        let opts = StampOptions::default()
            .with_mode(BrushBlendMode::Overwrite)
            .with_locks(ChannelLocks { h: true, a: true, ..ChannelLocks::NONE })
            .with_dither(true);
        let json = serde_json::to_string(&opts).unwrap();
        assert_eq!(serde_json::from_str::<StampOptions>(&json).unwrap(), opts);

        let user = UserColor::new(Bgra::new(1, 2, 3, 4), 9);
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(serde_json::from_str::<UserColor>(&json).unwrap(), user);

        let influence = ColorInfluence::new(42, false, true, true);
        let json = serde_json::to_value(influence).unwrap();
        assert_eq!(json["amount"], 42);
        assert_eq!(serde_json::from_value::<ColorInfluence>(json).unwrap(), influence);

        let scale_opts = ScaleOptions::default()
            .with_flip(true, false)
            .with_color_matrix(ColorMatrix::tint(BLUE, 0.5));
        let json = serde_json::to_string(&scale_opts).unwrap();
        assert_eq!(serde_json::from_str::<ScaleOptions>(&json).unwrap(), scale_opts);

        let blend: MergeBlend = serde_json::from_str("\"ColorDodge\"").unwrap();
        assert_eq!(blend, MergeBlend::ColorDodge);
    }

    #[test]
    fn test_settings_partial_json_uses_defaults() {
        let opts: StampOptions = serde_json::from_str(r#"{"wrap_around": true}"#).unwrap();
        assert_eq!(opts, StampOptions::default().with_wrap(true));
        let locks: ChannelLocks = serde_json::from_str(r#"{"v": true}"#).unwrap();
        assert!(locks.v && !locks.any_rgb());
    }
}

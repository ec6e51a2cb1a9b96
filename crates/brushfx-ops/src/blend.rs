//! Named blend operations for the staged-to-committed merge.
//!
//! A [`BlendOp`] combines a straight-alpha destination color with a
//! straight-alpha source color. Built-in operations ([`MergeBlend`]) follow
//! the usual separable formulas: the channel function `B(cb, cs)` is mixed
//! into the source by backdrop alpha, and the result is composited over the
//! backdrop with source alpha:
//!
//! ```text
//! cs' = (1 - ab) * cs + ab * B(cb, cs)
//! co  = as * cs' + ab * cb * (1 - as)
//! ao  = as + ab * (1 - as)
//! ```
//!
//! Operations are looked up by name through a [`BlendRegistry`].
//!
//! # Example
//!
//! ```rust
//! use brushfx_core::Bgra;
//! use brushfx_ops::blend::{BlendOp, BlendRegistry};
//!
//! let multiply = BlendRegistry::global().get("Multiply").unwrap();
//! let gray = Bgra::new(128, 128, 128, 255);
//! assert_eq!(multiply.apply(Bgra::WHITE, gray), gray);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use brushfx_core::Bgra;

use crate::channels::{color_unit, weighted_mix};
use crate::{OpsError, OpsResult};

/// A named color blend used when merging a stroke into the committed image.
pub trait BlendOp: Send + Sync {
    /// Name used for lookup.
    fn name(&self) -> &str;

    /// Blends straight `src` onto straight `dest`, returning a straight
    /// color.
    fn apply(&self, dest: Bgra, src: Bgra) -> Bgra;
}

impl fmt::Debug for dyn BlendOp + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlendOp({})", self.name())
    }
}

/// Built-in separable blend operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MergeBlend {
    /// `cb * cs`
    Multiply,
    /// `cb + cs - cb * cs`
    Screen,
    /// `min(cb, cs)`
    Darken,
    /// `max(cb, cs)`
    Lighten,
    /// `min(cb + cs, 1)`
    Add,
    /// `max(cb - cs, 0)`
    Subtract,
    /// `|cb - cs|`
    Difference,
    /// `cb + cs - 2 * cb * cs`
    Exclusion,
    /// Hard light with the layers swapped.
    Overlay,
    /// Multiply or screen depending on the source.
    HardLight,
    /// Soft contrast, W3C formula.
    SoftLight,
    /// Brightens the backdrop by the source.
    ColorDodge,
    /// Darkens the backdrop by the source.
    ColorBurn,
}

impl MergeBlend {
    /// All built-in operations.
    pub const ALL: [MergeBlend; 13] = [
        Self::Multiply,
        Self::Screen,
        Self::Darken,
        Self::Lighten,
        Self::Add,
        Self::Subtract,
        Self::Difference,
        Self::Exclusion,
        Self::Overlay,
        Self::HardLight,
        Self::SoftLight,
        Self::ColorDodge,
        Self::ColorBurn,
    ];

    /// Registry name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Multiply => "Multiply",
            Self::Screen => "Screen",
            Self::Darken => "Darken",
            Self::Lighten => "Lighten",
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Difference => "Difference",
            Self::Exclusion => "Exclusion",
            Self::Overlay => "Overlay",
            Self::HardLight => "HardLight",
            Self::SoftLight => "SoftLight",
            Self::ColorDodge => "ColorDodge",
            Self::ColorBurn => "ColorBurn",
        }
    }

    /// Blends one unit channel: backdrop `cb`, source `cs`.
    #[inline]
    pub fn channel(self, cb: f32, cs: f32) -> f32 {
        match self {
            Self::Multiply => cb * cs,
            Self::Screen => screen(cb, cs),
            Self::Darken => cb.min(cs),
            Self::Lighten => cb.max(cs),
            Self::Add => (cb + cs).min(1.0),
            Self::Subtract => (cb - cs).max(0.0),
            Self::Difference => (cb - cs).abs(),
            Self::Exclusion => cb + cs - 2.0 * cb * cs,
            Self::Overlay => hard_light(cs, cb),
            Self::HardLight => hard_light(cb, cs),
            Self::SoftLight => {
                if cs <= 0.5 {
                    cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
                } else {
                    let d = if cb <= 0.25 {
                        ((16.0 * cb - 12.0) * cb + 4.0) * cb
                    } else {
                        cb.sqrt()
                    };
                    cb + (2.0 * cs - 1.0) * (d - cb)
                }
            }
            Self::ColorDodge => {
                if cb <= 0.0 {
                    0.0
                } else if cs >= 1.0 {
                    1.0
                } else {
                    (cb / (1.0 - cs)).min(1.0)
                }
            }
            Self::ColorBurn => {
                if cb >= 1.0 {
                    1.0
                } else if cs <= 0.0 {
                    0.0
                } else {
                    1.0 - ((1.0 - cb) / cs).min(1.0)
                }
            }
        }
    }
}

#[inline]
fn screen(cb: f32, cs: f32) -> f32 {
    cb + cs - cb * cs
}

#[inline]
fn hard_light(cb: f32, cs: f32) -> f32 {
    if cs <= 0.5 {
        cb * 2.0 * cs
    } else {
        screen(cb, 2.0 * cs - 1.0)
    }
}

impl fmt::Display for MergeBlend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MergeBlend {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| OpsError::UnknownBlend(s.to_string()))
    }
}

impl BlendOp for MergeBlend {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn apply(&self, dest: Bgra, src: Bgra) -> Bgra {
        if src.a == 0 {
            return dest;
        }
        let ab = dest.a as f32 / 255.0;
        let sa = src.a as f32 / 255.0;
        let cb = color_unit(dest);
        let cs = color_unit(src);

        let mut mixed = [0.0f32; 3];
        for i in 0..3 {
            mixed[i] = (1.0 - ab) * cs[i] + ab * self.channel(cb[i], cs[i]);
        }

        let color = weighted_mix(cb, ab, mixed, 1.0, sa);
        let alpha = sa + ab * (1.0 - sa);
        Bgra::from_unit([color[0], color[1], color[2], alpha])
    }
}

/// Lookup table from operation name to [`BlendOp`].
///
/// Names are matched case-insensitively. [`BlendRegistry::global`] holds the
/// built-in set and is never mutated; hosts with custom operations build
/// their own registry.
#[derive(Default, Clone)]
pub struct BlendRegistry {
    ops: HashMap<String, Arc<dyn BlendOp>>,
}

impl BlendRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            ops: HashMap::new(),
        }
    }

    /// Creates a registry holding every [`MergeBlend`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for op in MergeBlend::ALL {
            registry.register(op);
        }
        registry
    }

    /// Returns the shared registry of built-in operations.
    pub fn global() -> &'static BlendRegistry {
        static INSTANCE: OnceLock<BlendRegistry> = OnceLock::new();
        INSTANCE.get_or_init(Self::with_builtins)
    }

    /// Adds an operation, replacing (and returning) any operation with the
    /// same name.
    pub fn register(&mut self, op: impl BlendOp + 'static) -> Option<Arc<dyn BlendOp>> {
        let key = op.name().to_ascii_lowercase();
        self.ops.insert(key, Arc::new(op))
    }

    /// Looks up an operation by name.
    pub fn get(&self, name: &str) -> Option<&dyn BlendOp> {
        self.ops.get(&name.to_ascii_lowercase()).map(|op| op.as_ref())
    }

    /// Looks up an operation by name, failing with
    /// [`OpsError::UnknownBlend`].
    pub fn require(&self, name: &str) -> OpsResult<&dyn BlendOp> {
        self.get(name)
            .ok_or_else(|| OpsError::UnknownBlend(name.to_string()))
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.ops.values().map(|op| op.name()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl fmt::Debug for BlendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlendRegistry")
            .field("ops", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn gray(v: u8) -> Bgra {
        Bgra::new(v, v, v, 255)
    }

    #[test]
    fn test_channel_formulas() {
        assert_abs_diff_eq!(MergeBlend::Multiply.channel(0.5, 0.5), 0.25);
        assert_abs_diff_eq!(MergeBlend::Screen.channel(0.5, 0.5), 0.75);
        assert_abs_diff_eq!(MergeBlend::Add.channel(0.7, 0.7), 1.0);
        assert_abs_diff_eq!(MergeBlend::Subtract.channel(0.3, 0.7), 0.0);
        assert_abs_diff_eq!(MergeBlend::Difference.channel(0.2, 0.7), 0.5);
        assert_abs_diff_eq!(MergeBlend::Exclusion.channel(0.5, 0.5), 0.5);
        assert_abs_diff_eq!(MergeBlend::Overlay.channel(0.25, 1.0), 0.5);
        assert_abs_diff_eq!(MergeBlend::HardLight.channel(1.0, 0.25), 0.5);
        assert_abs_diff_eq!(MergeBlend::SoftLight.channel(0.5, 0.5), 0.5);
        assert_abs_diff_eq!(MergeBlend::ColorDodge.channel(0.25, 0.5), 0.5);
        assert_abs_diff_eq!(MergeBlend::ColorDodge.channel(0.0, 1.0), 0.0);
        assert_abs_diff_eq!(MergeBlend::ColorBurn.channel(0.75, 0.5), 0.5);
        assert_abs_diff_eq!(MergeBlend::ColorBurn.channel(1.0, 0.0), 1.0);
    }

    #[test]
    fn test_opaque_apply() {
        assert_eq!(MergeBlend::Multiply.apply(Bgra::WHITE, gray(77)), gray(77));
        assert_eq!(MergeBlend::Screen.apply(Bgra::BLACK, gray(77)), gray(77));
        assert_eq!(MergeBlend::Darken.apply(gray(40), gray(90)), gray(40));
        assert_eq!(MergeBlend::Lighten.apply(gray(40), gray(90)), gray(90));
        // 200 * 128 / 255 = 100.4
        assert_eq!(MergeBlend::Multiply.apply(gray(200), gray(128)), gray(100));
    }

    #[test]
    fn test_transparent_source_keeps_dest() {
        let dest = Bgra::new(10, 20, 30, 99);
        for op in MergeBlend::ALL {
            assert_eq!(op.apply(dest, Bgra::TRANSPARENT), dest);
        }
    }

    #[test]
    fn test_transparent_backdrop_shows_source() {
        // No backdrop to blend with: the source color comes through as is.
        let src = Bgra::new(30, 60, 90, 128);
        for op in MergeBlend::ALL {
            assert_eq!(op.apply(Bgra::TRANSPARENT, src), src, "{op}");
        }
    }

    #[test]
    fn test_registry_lookup() {
        let reg = BlendRegistry::global();
        assert_eq!(reg.len(), MergeBlend::ALL.len());
        assert_eq!(reg.get("multiply").map(|op| op.name()), Some("Multiply"));
        assert_eq!(reg.get("COLORBURN").map(|op| op.name()), Some("ColorBurn"));
        assert!(reg.get("nope").is_none());
        assert!(matches!(reg.require("nope"), Err(OpsError::UnknownBlend(_))));
        assert!(reg.names().contains(&"SoftLight"));
    }

    struct KeepDest;

    impl BlendOp for KeepDest {
        fn name(&self) -> &str {
            "KeepDest"
        }

        fn apply(&self, dest: Bgra, _src: Bgra) -> Bgra {
            dest
        }
    }

    #[test]
    fn test_register_custom() {
        let mut reg = BlendRegistry::with_builtins();
        assert!(reg.register(KeepDest).is_none());
        let op = reg.require("keepdest").unwrap();
        assert_eq!(op.apply(Bgra::BLACK, Bgra::WHITE), Bgra::BLACK);

        // Re-registering under a built-in name replaces it.
        struct Multiply;
        impl BlendOp for Multiply {
            fn name(&self) -> &str {
                "MULTIPLY"
            }
            fn apply(&self, _dest: Bgra, src: Bgra) -> Bgra {
                src
            }
        }
        assert!(reg.register(Multiply).is_some());
        assert_eq!(reg.len(), MergeBlend::ALL.len() + 1);
    }

    #[test]
    fn test_parse_merge_blend() {
        assert_eq!("hardlight".parse::<MergeBlend>().unwrap(), MergeBlend::HardLight);
        for op in MergeBlend::ALL {
            assert_eq!(op.to_string().parse::<MergeBlend>().unwrap(), op);
        }
        assert!("vivid".parse::<MergeBlend>().is_err());
    }
}

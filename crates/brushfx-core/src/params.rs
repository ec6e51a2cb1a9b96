//! Per-call drawing parameters.
//!
//! These are plain values handed to the compositing operations. The host
//! validates user input and owns persistence; with the `serde` feature the
//! types can be stored in whatever settings format the host uses.

use crate::{Bgra, Error};

/// Channels that a drawing operation must leave untouched.
///
/// RGB locks act on the bytes of the destination pixel. HSV locks act on the
/// straight color: the destination's hue, saturation or value is copied into
/// the source before blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChannelLocks {
    /// Alpha
    pub a: bool,
    /// Red
    pub r: bool,
    /// Green
    pub g: bool,
    /// Blue
    pub b: bool,
    /// Hue
    pub h: bool,
    /// Saturation
    pub s: bool,
    /// Value
    pub v: bool,
}

impl ChannelLocks {
    /// Nothing locked.
    pub const NONE: ChannelLocks = ChannelLocks {
        a: false,
        r: false,
        g: false,
        b: false,
        h: false,
        s: false,
        v: false,
    };

    /// Only alpha locked, the usual "preserve transparency" setting.
    pub const ALPHA: ChannelLocks = ChannelLocks {
        a: true,
        ..Self::NONE
    };

    /// Returns `true` if R, G and B are all locked.
    #[inline]
    pub const fn all_rgb(&self) -> bool {
        self.r && self.g && self.b
    }

    /// Returns `true` if H, S and V are all locked.
    #[inline]
    pub const fn all_hsv(&self) -> bool {
        self.h && self.s && self.v
    }

    /// Returns `true` if any of R, G, B is locked.
    #[inline]
    pub const fn any_rgb(&self) -> bool {
        self.r || self.g || self.b
    }

    /// Returns `true` if any of H, S, V is locked.
    #[inline]
    pub const fn any_hsv(&self) -> bool {
        self.h || self.s || self.v
    }

    /// Returns `true` if one full color triad is locked, so no color byte
    /// can change.
    #[inline]
    pub const fn color_frozen(&self) -> bool {
        self.all_rgb() || self.all_hsv()
    }

    /// Returns `true` if nothing at all can change: a color triad and alpha
    /// are locked together.
    #[inline]
    pub const fn is_degenerate(&self) -> bool {
        self.color_frozen() && self.a
    }

    /// Returns `true` if no lock is set.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        !self.a && !self.any_rgb() && !self.any_hsv()
    }
}

/// How strongly the user color is mixed into a brush that keeps its own
/// colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColorInfluence {
    /// Percentage, `0..=100`
    pub amount: u8,
    /// Pull hue toward the user color
    pub hue: bool,
    /// Pull saturation toward the user color
    pub saturation: bool,
    /// Pull value toward the user color
    pub value: bool,
}

impl ColorInfluence {
    /// Creates an influence setting, clamping `amount` to 100.
    pub fn new(amount: u8, hue: bool, saturation: bool, value: bool) -> Self {
        Self {
            amount: amount.min(100),
            hue,
            saturation,
            value,
        }
    }

    /// Interpolation weight in `[0, 1]`.
    #[inline]
    pub fn factor(&self) -> f32 {
        self.amount.min(100) as f32 / 100.0
    }
}

/// The active drawing color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UserColor {
    /// Color, premultiplied
    pub color: Bgra,
    /// Alpha floor that damps the contribution of brush alpha jitter
    pub min_alpha: u8,
}

impl Default for UserColor {
    fn default() -> Self {
        Self {
            color: Bgra::BLACK,
            min_alpha: 0,
        }
    }
}

impl UserColor {
    /// Creates a user color from a premultiplied pixel.
    #[inline]
    pub const fn new(color: Bgra, min_alpha: u8) -> Self {
        Self { color, min_alpha }
    }

    /// Creates a user color from a straight pixel, premultiplying it.
    #[inline]
    pub fn from_straight(color: Bgra) -> Self {
        Self::new(color.to_premultiplied(), 0)
    }

    /// Returns the color with straight alpha.
    #[inline]
    pub fn straight(&self) -> Bgra {
        self.color.to_straight()
    }

    /// Scale applied to mask alpha when the brush keeps its own colors:
    /// `(255 - min_alpha) / 255`.
    #[inline]
    pub fn min_alpha_scale(&self) -> f32 {
        (255 - self.min_alpha) as f32 / 255.0
    }
}

/// How a brush stamp is combined with the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BrushBlendMode {
    /// Ink buildup: alpha only grows, toward the user color's alpha.
    #[default]
    Normal,
    /// Replace color and pull alpha toward the user color's alpha.
    Overwrite,
}

impl BrushBlendMode {
    /// All modes.
    pub const ALL: [BrushBlendMode; 2] = [Self::Normal, Self::Overwrite];

    /// Mode name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Overwrite => "overwrite",
        }
    }
}

impl std::str::FromStr for BrushBlendMode {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "overwrite" => Ok(Self::Overwrite),
            _ => Err(Error::UnknownBlendMode(s.to_string())),
        }
    }
}

/// Placement options shared by brush draw and masked overwrite.
///
/// ```
/// use brushfx_core::{BrushBlendMode, ChannelLocks, StampOptions};
///
/// let opts = StampOptions::default()
///     .with_mode(BrushBlendMode::Overwrite)
///     .with_locks(ChannelLocks::ALPHA)
///     .with_wrap(true);
/// assert!(!opts.dither);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StampOptions {
    /// Blend mode for brush draws; ignored by overwrite
    pub mode: BrushBlendMode,
    /// Channels to preserve
    pub locks: ChannelLocks,
    /// Repeat clipped pixels on the opposite edge
    pub wrap_around: bool,
    /// Only touch every other pixel in a checkerboard
    pub dither: bool,
}

impl StampOptions {
    /// Sets the blend mode.
    pub fn with_mode(mut self, mode: BrushBlendMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the channel locks.
    pub fn with_locks(mut self, locks: ChannelLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Enables or disables wrap-around.
    pub fn with_wrap(mut self, wrap_around: bool) -> Self {
        self.wrap_around = wrap_around;
        self
    }

    /// Enables or disables dithering.
    pub fn with_dither(mut self, dither: bool) -> Self {
        self.dither = dither;
        self
    }
}

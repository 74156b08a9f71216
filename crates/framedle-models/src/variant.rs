//! Image variant taxonomy.
//!
//! Every extracted frame is turned into the same fixed set of derived
//! images. Consumers rely on the names and dimension classes below, so the
//! table is a process-wide constant rather than runtime configuration.

use serde::Serialize;
use std::fmt;

/// Quadrant of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::TopLeft => "tl",
            Quadrant::TopRight => "tr",
            Quadrant::BottomLeft => "bl",
            Quadrant::BottomRight => "br",
        }
    }

    /// True for the two right-hand quadrants.
    pub fn is_right(&self) -> bool {
        matches!(self, Quadrant::TopRight | Quadrant::BottomRight)
    }

    /// True for the two lower quadrants.
    pub fn is_bottom(&self) -> bool {
        matches!(self, Quadrant::BottomLeft | Quadrant::BottomRight)
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transform applied to produce a variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariantKind {
    /// Resize to `width`, preserving aspect ratio.
    Resize { width: u32 },
    /// Keep the centered `fraction` of each dimension, then upscale to the
    /// standard frame width.
    CenterCrop { fraction: f64 },
    /// Luminance replicated across R, G and B.
    Desaturate,
    /// Downsample to `blocks` x `blocks`, then nearest-neighbor upscale to
    /// the standard frame width.
    Pixelate { blocks: u32 },
    /// Crop one quadrant without resampling.
    Quadrant { corner: Quadrant },
}

/// A named entry of the variant taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariantSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: VariantKind,
    pub description: &'static str,
}

impl VariantSpec {
    pub const fn new(name: &'static str, kind: VariantKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
        }
    }
}

/// The fixed variant taxonomy.
pub const VARIANT_TAXONOMY: &[VariantSpec] = &[
    VariantSpec::new("thumb", VariantKind::Resize { width: 320 }, "Thumbnail"),
    VariantSpec::new(
        "crop_25",
        VariantKind::CenterCrop { fraction: 0.25 },
        "Center 25% crop (Daily Frame hint 1)",
    ),
    VariantSpec::new(
        "crop_50",
        VariantKind::CenterCrop { fraction: 0.50 },
        "Center 50% crop (Daily Frame hint 2)",
    ),
    VariantSpec::new(
        "desat",
        VariantKind::Desaturate,
        "Desaturated (Daily Frame hints 1-3)",
    ),
    VariantSpec::new(
        "px8",
        VariantKind::Pixelate { blocks: 8 },
        "8x8 pixelated (Pixel Reveal level 1)",
    ),
    VariantSpec::new("px16", VariantKind::Pixelate { blocks: 16 }, "16x16 pixelated"),
    VariantSpec::new("px32", VariantKind::Pixelate { blocks: 32 }, "32x32 pixelated"),
    VariantSpec::new("px64", VariantKind::Pixelate { blocks: 64 }, "64x64 pixelated"),
    VariantSpec::new("px128", VariantKind::Pixelate { blocks: 128 }, "128x128 pixelated"),
    VariantSpec::new(
        "frag_tl",
        VariantKind::Quadrant {
            corner: Quadrant::TopLeft,
        },
        "Top-left quadrant (Fragment Match)",
    ),
    VariantSpec::new(
        "frag_tr",
        VariantKind::Quadrant {
            corner: Quadrant::TopRight,
        },
        "Top-right quadrant",
    ),
    VariantSpec::new(
        "frag_bl",
        VariantKind::Quadrant {
            corner: Quadrant::BottomLeft,
        },
        "Bottom-left quadrant",
    ),
    VariantSpec::new(
        "frag_br",
        VariantKind::Quadrant {
            corner: Quadrant::BottomRight,
        },
        "Bottom-right quadrant",
    ),
];

/// Look up a taxonomy entry by name.
pub fn find_variant(name: &str) -> Option<&'static VariantSpec> {
    VARIANT_TAXONOMY.iter().find(|spec| spec.name == name)
}

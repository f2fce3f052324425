//! Shared types for engine objects and their on-canvas geometry

use serde::{Deserialize, Serialize};

/// Identifier of an engine-side object
pub type ObjectId = u64;

/// Object rectangle in canvas coordinates (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// Minimum and maximum size a widget may be resized to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimits {
    pub min_w: i32,
    pub min_h: i32,
    pub max_w: i32,
    pub max_h: i32,
}

impl SizeLimits {
    pub const fn new(min_w: i32, min_h: i32, max_w: i32, max_h: i32) -> Self {
        Self {
            min_w,
            min_h,
            max_w,
            max_h,
        }
    }

    /// Clamp a requested size into these limits
    pub fn clamp(&self, w: i32, h: i32) -> (i32, i32) {
        (w.clamp(self.min_w, self.max_w), h.clamp(self.min_h, self.max_h))
    }
}

/// Value range of an engine object as exposed to the UI
///
/// A degenerate range (`min == max`) marks an unbounded value such as a
/// number box, which is passed through without scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// Normalised 0..1 range (toggles, plain sliders)
    pub const UNIT: ValueRange = ValueRange { min: 0.0, max: 1.0 };

    /// Unbounded pass-through range
    pub const UNBOUNDED: ValueRange = ValueRange { min: 0.0, max: 0.0 };

    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// True if values in this range are scaled (min != max)
    pub fn is_bounded(&self) -> bool {
        self.min != self.max
    }

    /// Clamp a value into the range, handling inverted ranges (min > max)
    pub fn clamp(&self, value: f32) -> f32 {
        if !self.is_bounded() {
            return value;
        }
        let (lo, hi) = if self.min < self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        value.clamp(lo, hi)
    }

    /// Map a normalised 0..1 value into this range
    pub fn denormalize(&self, normalized: f32) -> f32 {
        if !self.is_bounded() {
            return normalized;
        }
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }

    /// Map a value in this range onto 0..1
    pub fn normalize(&self, value: f32) -> f32 {
        if !self.is_bounded() {
            return value;
        }
        ((self.clamp(value) - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::UNIT
    }
}

/// The kinds of GUI object the editor knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuiKind {
    Bang,
    Toggle,
    Message,
    Number,
    HorizontalSlider,
    VerticalSlider,
    HorizontalRadio,
    VerticalRadio,
    Array,
    GraphOnParent,
    Subpatch,
    Comment,
    MousePad,
    /// Plain object box (no GUI of its own, drawn as its text)
    Object,
}

impl GuiKind {
    /// Resolve a Pd class name to a GUI kind
    ///
    /// Returns `None` for plain (non-GUI) objects.
    pub fn from_class_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bng" => Self::Bang,
            "tgl" => Self::Toggle,
            "msg" => Self::Message,
            "nbx" | "floatatom" => Self::Number,
            "hsl" => Self::HorizontalSlider,
            "vsl" => Self::VerticalSlider,
            "hradio" => Self::HorizontalRadio,
            "vradio" => Self::VerticalRadio,
            "array" => Self::Array,
            "graph" => Self::GraphOnParent,
            "pd" => Self::Subpatch,
            "comment" | "text" => Self::Comment,
            "pad" => Self::MousePad,
            "obj" => Self::Object,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical Pd class name for this kind
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Bang => "bng",
            Self::Toggle => "tgl",
            Self::Message => "msg",
            Self::Number => "nbx",
            Self::HorizontalSlider => "hsl",
            Self::VerticalSlider => "vsl",
            Self::HorizontalRadio => "hradio",
            Self::VerticalRadio => "vradio",
            Self::Array => "array",
            Self::GraphOnParent => "graph",
            Self::Subpatch => "pd",
            Self::Comment => "comment",
            Self::MousePad => "pad",
            Self::Object => "obj",
        }
    }

    /// Default value range for a freshly created object of this kind
    pub fn default_range(&self) -> ValueRange {
        match self {
            Self::HorizontalSlider | Self::VerticalSlider => ValueRange::new(0.0, 127.0),
            Self::HorizontalRadio | Self::VerticalRadio => ValueRange::new(0.0, 7.0),
            Self::Array => ValueRange::new(-1.0, 1.0),
            Self::Number | Self::Message | Self::Comment | Self::MousePad | Self::Object => {
                ValueRange::UNBOUNDED
            }
            _ => ValueRange::UNIT,
        }
    }

    /// Default on-canvas size for a freshly created object of this kind
    pub fn default_size(&self) -> (i32, i32) {
        match self {
            Self::Bang | Self::Toggle => (25, 25),
            Self::Message => (60, 22),
            Self::Number => (50, 22),
            Self::HorizontalSlider => (130, 18),
            Self::VerticalSlider => (18, 130),
            Self::HorizontalRadio => (144, 18),
            Self::VerticalRadio => (18, 144),
            Self::Array | Self::GraphOnParent => (200, 140),
            Self::Subpatch => (60, 22),
            Self::Comment => (120, 22),
            Self::MousePad => (127, 127),
            Self::Object => (60, 22),
        }
    }
}

//! # Style Primitives
//!
//! The small value types shared by configuration, layout and the drawing
//! surface: print colors, four-sided margins, 2D offsets, and the
//! millimetre → point conversion used at the surface boundary.
//!
//! Label stock is specified in millimetres, PDF speaks points. Everything
//! upstream of the surface stays in millimetres; [`mm`] is applied exactly
//! once, when a coordinate is handed to a [`Surface`](crate::surface::Surface).

use serde::{Deserialize, Serialize};

/// Points per millimetre (72 pt per inch, 25.4 mm per inch).
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Convert millimetres to PDF points.
pub fn mm(value: f64) -> f64 {
    value * PT_PER_MM
}

/// A print color. Channels are in `0.0..=1.0`.
///
/// Label printers are usually driven in CMYK, so that's what configurations
/// use by default; RGB is accepted for screen proofs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Cmyk {
        cyan: f64,
        magenta: f64,
        yellow: f64,
        black: f64,
    },
    Rgb {
        r: f64,
        g: f64,
        b: f64,
    },
}

impl Color {
    pub const BLACK: Color = Color::Cmyk {
        cyan: 0.0,
        magenta: 0.0,
        yellow: 0.0,
        black: 1.0,
    };

    pub fn cmyk(cyan: f64, magenta: f64, yellow: f64, black: f64) -> Self {
        Color::Cmyk {
            cyan,
            magenta,
            yellow,
            black,
        }
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color::Rgb { r, g, b }
    }

    /// True when every channel lies in `0.0..=1.0`.
    pub fn is_valid(&self) -> bool {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        match *self {
            Color::Cmyk {
                cyan,
                magenta,
                yellow,
                black,
            } => [cyan, magenta, yellow, black].into_iter().all(in_range),
            Color::Rgb { r, g, b } => [r, g, b].into_iter().all(in_range),
        }
    }

    /// PDF operator setting this as the non-stroking (fill) color.
    pub fn fill_operator(&self) -> String {
        match *self {
            Color::Cmyk {
                cyan,
                magenta,
                yellow,
                black,
            } => format!("{:.3} {:.3} {:.3} {:.3} k", cyan, magenta, yellow, black),
            Color::Rgb { r, g, b } => format!("{:.3} {:.3} {:.3} rg", r, g, b),
        }
    }

    /// PDF operator setting this as the stroking color.
    pub fn stroke_operator(&self) -> String {
        match *self {
            Color::Cmyk {
                cyan,
                magenta,
                yellow,
                black,
            } => format!("{:.3} {:.3} {:.3} {:.3} K", cyan, magenta, yellow, black),
            Color::Rgb { r, g, b } => format!("{:.3} {:.3} {:.3} RG", r, g, b),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Values for each edge (top, right, bottom, left), in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    pub(crate) fn any_negative(&self) -> bool {
        self.top < 0.0 || self.right < 0.0 || self.bottom < 0.0 || self.left < 0.0
    }
}

/// A 2D displacement in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

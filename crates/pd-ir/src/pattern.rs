//! Pattern slots and corner configurations.

use alloc::vec::Vec;
use core::fmt;

use crate::color::Color;
use crate::corner::Corner;

/// Fewest sides a polygon may have.
pub const MIN_SIDES: u32 = 3;
/// Most sides a polygon may have.
pub const MAX_SIDES: u32 = 64;
/// Smallest radius in surface units.
pub const MIN_RADIUS: f64 = 5.0;
/// Largest radius in surface units.
pub const MAX_RADIUS: f64 = 300.0;

/// One of the four pattern slots every polygon carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatternKey {
    #[default]
    A,
    B,
    C,
    D,
}

impl PatternKey {
    /// All slots in display order.
    pub const ALL: [PatternKey; 4] = [PatternKey::A, PatternKey::B, PatternKey::C, PatternKey::D];

    /// Slot index 0..4.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parse a slot letter, case-insensitive.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(PatternKey::A),
            'B' => Some(PatternKey::B),
            'C' => Some(PatternKey::C),
            'D' => Some(PatternKey::D),
            _ => None,
        }
    }

    /// The slot letter.
    pub const fn as_char(self) -> char {
        match self {
            PatternKey::A => 'A',
            PatternKey::B => 'B',
            PatternKey::C => 'C',
            PatternKey::D => 'D',
        }
    }
}

impl fmt::Display for PatternKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Shape and notes of a polygon for one pattern slot.
///
/// `corners.len() == side_count` always holds; every mutator that
/// changes the side count rebuilds the corner list.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternConfig {
    side_count: u32,
    radius: f64,
    stroke: Color,
    fill: Color,
    corners: Vec<Corner>,
}

impl PatternConfig {
    /// A configuration with base corners. Inputs are clamped.
    pub fn new(side_count: u32, radius: f64, stroke: Color) -> Self {
        let side_count = clamp_sides(side_count);
        Self {
            side_count,
            radius: clamp_radius(radius),
            stroke,
            fill: Color::fill_for(stroke),
            corners: base_corners(side_count),
        }
    }

    pub fn side_count(&self) -> u32 {
        self.side_count
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn stroke(&self) -> Color {
        self.stroke
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    pub fn corner(&self, index: usize) -> Option<&Corner> {
        self.corners.get(index)
    }

    pub fn corner_mut(&mut self, index: usize) -> Option<&mut Corner> {
        self.corners.get_mut(index)
    }

    /// Change the side count, discarding every per-corner note.
    ///
    /// Corners are rebuilt even when the count is unchanged.
    pub fn set_side_count(&mut self, side_count: u32) {
        self.side_count = clamp_sides(side_count);
        self.corners = base_corners(self.side_count);
    }

    /// Set the radius, clamped into `[MIN_RADIUS, MAX_RADIUS]`.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = clamp_radius(radius);
    }

    /// Set the stroke color; the fill follows at 25% alpha.
    pub fn set_stroke(&mut self, stroke: Color) {
        self.stroke = stroke;
        self.fill = Color::fill_for(stroke);
    }

    /// Copy notes and lengths from `corners`, truncated or padded with base corners
    /// so the count still equals the side count.
    pub fn set_corners(&mut self, corners: &[Corner]) {
        self.corners = (0..self.side_count)
            .map(|i| {
                let mut corner = Corner::new(i);
                if let Some(src) = corners.get(i as usize) {
                    corner.set_note(src.note);
                    corner.set_length_factor(src.length_factor);
                }
                corner
            })
            .collect();
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self::new(6, 80.0, Color::CYAN)
    }
}

fn clamp_sides(side_count: u32) -> u32 {
    side_count.clamp(MIN_SIDES, MAX_SIDES)
}

fn clamp_radius(radius: f64) -> f64 {
    if radius.is_nan() {
        return MIN_RADIUS;
    }
    radius.clamp(MIN_RADIUS, MAX_RADIUS)
}

fn base_corners(side_count: u32) -> Vec<Corner> {
    (0..side_count).map(Corner::new).collect()
}

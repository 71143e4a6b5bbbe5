//! Rotation angles and trigger-line crossing detection.
//!
//! A polygon turns once per `4 * measure_count` beats. Corner 0 points
//! straight up at t = 0, and the trigger line is the same upward
//! direction, so corner 0 sounds on every bar line of its period.

use core::f64::consts::{FRAC_PI_2, PI, TAU};

use pd_ir::{Polygon, Position, TimeBase};

/// Angle of the trigger line: straight up on a y-down surface.
pub const TRIGGER_ANGLE: f64 = 1.5 * PI;

/// A corner within 12 degrees of the trigger line counts as a hit.
pub const TRIGGER_TOLERANCE: f64 = 12.0 * PI / 180.0;

/// Upper bound on corners inside the trigger window at once.
///
/// With at most 64 sides the corners are 5.625 degrees apart, so a
/// 24 degree window can never hold more than five of them.
pub const MAX_SIMULTANEOUS_HITS: usize = 8;

/// A corner inside the trigger window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Corner index in the live configuration
    pub corner: usize,
    /// Shorter-arc distance to the trigger line, radians
    pub distance: f64,
}

/// Corners inside the trigger window, in corner order.
pub type Hits = heapless::Vec<Hit, MAX_SIMULTANEOUS_HITS>;

/// Rotation state of one polygon at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    angle: f64,
    side_count: u32,
}

impl Rotation {
    /// Rotation of `polygon` after `seconds` of transport time.
    pub fn at(polygon: &Polygon, time_base: TimeBase, seconds: f64) -> Self {
        let beats = time_base.beats_elapsed(seconds);
        Self {
            angle: angle(beats, polygon.rotation_period_beats()),
            side_count: polygon.live().side_count(),
        }
    }

    /// Accumulated rotation in radians (not wrapped).
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Absolute angle of corner `index`.
    pub fn corner_angle(&self, index: u32) -> f64 {
        if self.side_count == 0 {
            return self.angle - FRAC_PI_2;
        }
        self.angle - FRAC_PI_2 + (index as f64 / self.side_count as f64) * TAU
    }

    /// Screen position of corner `index` around `center`.
    pub fn corner_position(&self, center: Position, radius: f64, index: u32) -> Position {
        let theta = self.corner_angle(index);
        Position::new(
            center.x + libm::cos(theta) * radius,
            center.y + libm::sin(theta) * radius,
        )
    }

    /// Every corner currently inside the trigger window.
    pub fn hits(&self) -> Hits {
        let mut hits = Hits::new();
        for index in 0..self.side_count {
            let distance = trigger_distance(self.corner_angle(index));
            if distance < TRIGGER_TOLERANCE {
                let _ = hits.push(Hit { corner: index as usize, distance });
            }
        }
        hits
    }
}

/// Rotation in radians after `beats`, for a period of `period_beats`.
///
/// Linear, no offset. A non-positive period does not rotate.
pub fn angle(beats: f64, period_beats: f64) -> f64 {
    if period_beats <= 0.0 {
        return 0.0;
    }
    beats / period_beats * TAU
}

/// Wrap an angle into `[0, 2π)`.
pub fn normalize(theta: f64) -> f64 {
    let wrapped = theta - TAU * libm::floor(theta / TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shorter-arc distance from `theta` to the trigger line.
pub fn trigger_distance(theta: f64) -> f64 {
    let d = libm::fabs(normalize(theta) - TRIGGER_ANGLE);
    d.min(TAU - d)
}

/// Result of evaluating one polygon against the trigger line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Crossing {
    /// Corners that start a note this evaluation (empty while latched)
    pub onsets: Hits,
    /// Distance of the nearest corner in the window, for line feedback
    pub nearest: Option<f64>,
}

/// Edge-triggered hit detection.
///
/// The polygon latch rises on the first evaluation with any corner in
/// the window and every corner in the window fires once. It falls only
/// when the window is empty, so a corner that lingers near the line
/// across several evaluations fires once however finely time is sampled.
pub fn detect_crossing(polygon: &mut Polygon, rotation: &Rotation) -> Crossing {
    let hits = rotation.hits();
    if hits.is_empty() {
        polygon.was_triggering = false;
        return Crossing::default();
    }

    let nearest = hits.iter().map(|h| h.distance).reduce(f64::min);
    if polygon.was_triggering {
        return Crossing { onsets: Hits::new(), nearest };
    }

    polygon.was_triggering = true;
    Crossing { onsets: hits, nearest }
}

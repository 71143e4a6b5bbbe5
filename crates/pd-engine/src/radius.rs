//! Default radii for new polygons.

use alloc::vec::Vec;

/// Radius of the first fresh slot.
pub const BASE_RADIUS: f64 = 30.0;

/// Growth between consecutive fresh slots.
pub const RADIUS_STEP: f64 = 40.0;

/// Hands out concentric radii so new polygons do not sit on top of
/// each other. A removed polygon's radius is handed out again before
/// any fresh one (last freed, first reused).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RadiusAllocator {
    next_slot: u32,
    free: Vec<f64>,
}

impl RadiusAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> f64 {
        if let Some(radius) = self.free.pop() {
            return radius;
        }
        let radius = BASE_RADIUS + self.next_slot as f64 * RADIUS_STEP;
        self.next_slot += 1;
        radius
    }

    /// Return a radius to the pool.
    pub fn release(&mut self, radius: f64) {
        self.free.push(radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_slots_grow_by_step() {
        let mut radii = RadiusAllocator::new();
        assert_eq!(radii.allocate(), 30.0);
        assert_eq!(radii.allocate(), 70.0);
        assert_eq!(radii.allocate(), 110.0);
    }

    #[test]
    fn freed_radii_are_reused_last_first() {
        let mut radii = RadiusAllocator::new();
        let a = radii.allocate();
        let b = radii.allocate();
        radii.release(a);
        radii.release(b);
        assert_eq!(radii.allocate(), b);
        assert_eq!(radii.allocate(), a);
        assert_eq!(radii.allocate(), 110.0);
    }
}

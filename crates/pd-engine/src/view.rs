//! Read-only snapshots for a renderer.

use alloc::vec::Vec;
use arrayvec::ArrayString;

use pd_ir::{note_label, Color, PatternKey, Polygon, PolygonKey, Position, Sequence};

use crate::rotation::Rotation;

/// One corner as it should be drawn this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CornerView {
    pub index: u32,
    /// Absolute angle, radians
    pub angle: f64,
    pub position: Position,
    pub note: f64,
    /// Palette name of the note, "pause" for rests, "?" otherwise
    pub label: &'static str,
    pub length_factor: f64,
    pub selected: bool,
}

/// One polygon as it should be drawn this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonView {
    pub key: PolygonKey,
    pub name: ArrayString<32>,
    pub position: Position,
    pub side_count: u32,
    pub radius: f64,
    pub stroke: Color,
    pub fill: Color,
    pub active_pattern: PatternKey,
    pub sequence: Sequence,
    pub measure_count: u32,
    pub selected: bool,
    pub corners: Vec<CornerView>,
}

impl PolygonView {
    pub fn new(polygon: &Polygon, rotation: &Rotation, selected: bool) -> Self {
        let live = polygon.live();
        let corners = live
            .corners()
            .iter()
            .map(|c| CornerView {
                index: c.index,
                angle: rotation.corner_angle(c.index),
                position: rotation.corner_position(polygon.position, live.radius(), c.index),
                note: c.note,
                label: note_label(c.note),
                length_factor: c.length_factor,
                selected: selected && polygon.selected_corner == Some(c.index as usize),
            })
            .collect();

        Self {
            key: polygon.id(),
            name: polygon.name,
            position: polygon.position,
            side_count: live.side_count(),
            radius: live.radius(),
            stroke: live.stroke(),
            fill: live.fill(),
            active_pattern: polygon.active_key(),
            sequence: polygon.sequence().clone(),
            measure_count: polygon.measure_count(),
            selected,
            corners,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_ir::{PatternConfig, TimeBase};
    use slotmap::KeyData;

    #[test]
    fn view_mirrors_live_slot() {
        let mut p = Polygon::new(
            PolygonKey::from(KeyData::from_ffi(1)),
            1,
            Position::new(200.0, 200.0),
            PatternConfig::new(4, 50.0, Color::CYAN),
        );
        p.set_corner_note(2, 0.0);
        p.selected_corner = Some(1);
        let rotation = Rotation::at(&p, TimeBase::default(), 0.0);

        let view = PolygonView::new(&p, &rotation, true);

        assert_eq!(view.side_count, 4);
        assert_eq!(view.fill, Color::fill_for(Color::CYAN));
        assert_eq!(view.active_pattern, PatternKey::A);
        assert_eq!(view.corners.len(), 4);
        assert_eq!(view.corners[0].label, "C");
        assert_eq!(view.corners[2].label, "pause");
        assert!(view.corners[1].selected);
        assert!((view.corners[0].position.y - 150.0).abs() < 1e-9);
    }

    #[test]
    fn unselected_polygon_has_no_selected_corner() {
        let mut p = Polygon::new(
            PolygonKey::from(KeyData::from_ffi(1)),
            1,
            Position::new(200.0, 200.0),
            PatternConfig::default(),
        );
        p.selected_corner = Some(0);
        let rotation = Rotation::at(&p, TimeBase::default(), 1.0);
        let view = PolygonView::new(&p, &rotation, false);
        assert!(view.corners.iter().all(|c| !c.selected));
    }
}

//! RON session files.
//!
//! A session lists the tempo, the surface and every polygon with its
//! per-slot corners. Every value is clamped when applied, so a session
//! file can only fail to parse, never fail to load.

use pd_engine::{Engine, PolygonOptions};
use pd_ir::{Color, Corner, PatternKey, Position, Surface};
use serde::{Deserialize, Serialize};

use crate::ControllerError;

/// A whole session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionFile {
    /// Beats per minute
    pub tempo: f64,
    /// Surface width and height
    pub surface: (f64, f64),
    pub polygons: Vec<PolygonEntry>,
}

/// One polygon of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonEntry {
    /// Side count shared by all slots unless a slot overrides it
    pub sides: Option<u32>,
    /// Radius; the next free allocator radius when absent
    pub radius: Option<f64>,
    pub measures: u32,
    /// Centre; the surface centre when absent
    pub position: Option<(f64, f64)>,
    /// Stroke as `#rrggbb`
    pub color: Option<String>,
    pub sequence: String,
    pub slots: Vec<SlotEntry>,
}

/// Contents of one pattern slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub key: PatternKey,
    #[serde(default)]
    pub sides: Option<u32>,
    #[serde(default)]
    pub radius: Option<f64>,
    /// Stroke of this slot; the polygon color when absent
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub corners: Vec<Corner>,
}

impl Default for SessionFile {
    fn default() -> Self {
        let surface = Surface::default();
        Self {
            tempo: 120.0,
            surface: (surface.width, surface.height),
            polygons: Vec::new(),
        }
    }
}

impl Default for PolygonEntry {
    fn default() -> Self {
        Self {
            sides: None,
            radius: None,
            measures: 1,
            position: None,
            color: None,
            sequence: "A".into(),
            slots: Vec::new(),
        }
    }
}

impl SessionFile {
    /// Parse a RON document.
    pub fn from_ron(text: &str) -> Result<Self, ControllerError> {
        Ok(ron::from_str(text)?)
    }

    /// Pretty-printed RON.
    pub fn to_ron(&self) -> Result<String, ControllerError> {
        let config = ron::ser::PrettyConfig::new().depth_limit(4);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Two polygons that fall in and out of phase: a hexagon over one
    /// measure and a square over two, alternating slots A and B.
    pub fn demo() -> Self {
        let scale = |key, notes: &[f64]| SlotEntry {
            key,
            sides: None,
            radius: None,
            color: None,
            corners: notes
                .iter()
                .enumerate()
                .map(|(i, &note)| Corner { index: i as u32, note, length_factor: 0.5 })
                .collect(),
        };
        Self {
            polygons: vec![
                PolygonEntry {
                    sides: Some(6),
                    color: Some("#22d3ee".into()),
                    sequence: "AB".into(),
                    slots: vec![
                        scale(PatternKey::A, &[261.63, 293.66, 329.63, 392.0, 440.0, 523.25]),
                        scale(PatternKey::B, &[523.25, 440.0, 392.0, 329.63, 293.66, 261.63]),
                    ],
                    ..PolygonEntry::default()
                },
                PolygonEntry {
                    sides: Some(4),
                    measures: 2,
                    color: Some("#f472b6".into()),
                    slots: vec![scale(PatternKey::A, &[130.81, 0.0, 196.0, 0.0])],
                    ..PolygonEntry::default()
                },
            ],
            ..Self::default()
        }
    }

    /// Capture an engine's polygons, in insertion order, with all four slots.
    pub fn capture(engine: &Engine) -> Self {
        let surface = engine.surface();
        let polygons = engine
            .polygons()
            .map(|polygon| {
                let live = polygon.live();
                let slots = polygon
                    .store()
                    .iter()
                    .map(|(key, config)| SlotEntry {
                        key,
                        sides: Some(config.side_count()),
                        radius: Some(config.radius()),
                        color: Some(config.stroke().to_string()),
                        corners: config.corners().to_vec(),
                    })
                    .collect();
                PolygonEntry {
                    sides: Some(live.side_count()),
                    radius: Some(live.radius()),
                    measures: polygon.measure_count(),
                    position: Some((polygon.position.x, polygon.position.y)),
                    color: Some(live.stroke().to_string()),
                    sequence: polygon.sequence().to_string(),
                    slots,
                }
            })
            .collect();
        Self {
            tempo: engine.time_base().bpm(),
            surface: (surface.width, surface.height),
            polygons,
        }
    }

    /// Build a paused engine at the reset position holding this session.
    pub fn build_engine(&self) -> Engine {
        let mut engine = Engine::new(self.tempo, self.surface());
        engine.pause();

        for (n, entry) in self.polygons.iter().enumerate() {
            let stroke = entry.color.as_deref().map_or(Color::palette(n), |text| {
                parse_color(text, n).unwrap_or(Color::palette(n))
            });
            let key = engine.add_polygon(PolygonOptions {
                position: entry.position.map(|(x, y)| Position::new(x, y)),
                side_count: entry.sides,
                radius: entry.radius,
                stroke: Some(stroke),
                measure_count: Some(entry.measures),
            });
            engine.set_sequence(key, &entry.sequence);

            for slot in &entry.slots {
                engine.select_pattern(key, slot.key);
                if let Some(sides) = slot.sides {
                    engine.set_side_count(key, sides);
                }
                if let Some(radius) = slot.radius {
                    engine.set_radius(key, radius);
                }
                if let Some(color) = slot.color.as_deref().and_then(|text| parse_color(text, n)) {
                    engine.set_stroke(key, color);
                }
                for corner in &slot.corners {
                    let index = corner.index as usize;
                    let applied = engine.set_corner_note(key, index, corner.note)
                        && engine.set_corner_length(key, index, corner.length_factor);
                    if !applied {
                        log::warn!(
                            target: "session",
                            "polygon {} slot {}: no corner {}",
                            n + 1,
                            slot.key,
                            index
                        );
                    }
                }
            }
        }

        engine.reset();
        engine
    }

    fn surface(&self) -> Surface {
        let (width, height) = self.surface;
        let default = Surface::default();
        let side = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        Surface::new(side(width, default.width), side(height, default.height))
    }
}

fn parse_color(text: &str, n: usize) -> Option<Color> {
    match text.parse::<Color>() {
        Ok(color) => Some(color),
        Err(_) => {
            log::warn!(target: "session", "polygon {}: bad color {:?}", n + 1, text);
            None
        }
    }
}

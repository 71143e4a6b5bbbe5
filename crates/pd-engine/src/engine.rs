//! The session engine: every polygon, the transport and the tempo.

use alloc::vec::Vec;
use slotmap::{SecondaryMap, SlotMap};

use pd_ir::{
    Color, PatternConfig, PatternKey, Polygon, PolygonKey, Position, Sequence, Surface, TimeBase,
};

use crate::export::{self, ExportPlan, ExportSnapshot};
use crate::radius::RadiusAllocator;
use crate::rotation::{detect_crossing, Rotation};
use crate::sequencer::{self, Transition};
use crate::timeline::NoteTimeline;
use crate::transport::Transport;
use crate::trigger::{live_note_event, tone_for_corner, ToneSink, ToneTrigger};
use crate::view::PolygonView;

/// Side count of a polygon added without one.
pub const DEFAULT_SIDES: u32 = 6;

/// Optional overrides for [`Engine::add_polygon`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PolygonOptions {
    /// Defaults to the surface centre
    pub position: Option<Position>,
    pub side_count: Option<u32>,
    /// Defaults to the next allocator radius
    pub radius: Option<f64>,
    pub stroke: Option<Color>,
    pub measure_count: Option<u32>,
}

/// A corner that crossed the trigger line this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Onset {
    pub polygon: PolygonKey,
    pub corner: usize,
    /// `None` for rests and inaudible frequencies
    pub tone: Option<ToneTrigger>,
}

/// What happened during one [`Engine::tick`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub elapsed: f64,
    pub onsets: Vec<Onset>,
    /// Cycle boundaries that switched a polygon to another slot
    pub transitions: Vec<(PolygonKey, Transition)>,
    /// Closest corner to the trigger line over all polygons
    pub nearest_hit: Option<f64>,
}

/// All session state, driven one tick at a time.
pub struct Engine {
    time_base: TimeBase,
    transport: Transport,
    surface: Surface,
    polygons: SlotMap<PolygonKey, Polygon>,
    /// Insertion order, used for export track order
    order: Vec<PolygonKey>,
    radii: RadiusAllocator,
    /// Radius each polygon took from the allocator, if any
    allocated: SecondaryMap<PolygonKey, f64>,
    recordings: SecondaryMap<PolygonKey, NoteTimeline>,
    next_number: u32,
    selected: Option<PolygonKey>,
    /// Keyboard note assignment cursor
    assign_index: usize,
}

impl Engine {
    /// An empty session, playing from the reset offset.
    pub fn new(bpm: f64, surface: Surface) -> Self {
        Self {
            time_base: TimeBase::new(bpm),
            transport: Transport::new(),
            surface,
            polygons: SlotMap::with_key(),
            order: Vec::new(),
            radii: RadiusAllocator::new(),
            allocated: SecondaryMap::new(),
            recordings: SecondaryMap::new(),
            next_number: 1,
            selected: None,
            assign_index: 0,
        }
    }

    pub fn time_base(&self) -> TimeBase {
        self.time_base
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn elapsed(&self) -> f64 {
        self.transport.elapsed()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    // --- Polygons ---

    /// Add a polygon with its default configuration in all four slots.
    pub fn add_polygon(&mut self, options: PolygonOptions) -> PolygonKey {
        let number = self.next_number;
        self.next_number += 1;

        let allocated = match options.radius {
            Some(_) => None,
            None => Some(self.radii.allocate()),
        };
        let radius = options.radius.or(allocated).unwrap_or_default();
        let config = PatternConfig::new(
            options.side_count.unwrap_or(DEFAULT_SIDES),
            radius,
            options.stroke.unwrap_or(Color::CYAN),
        );
        let position = options.position.unwrap_or_else(|| self.surface.center());
        let surface = self.surface;

        let key = self.polygons.insert_with_key(|key| {
            let mut polygon = Polygon::new(key, number, position, config);
            polygon.set_measure_count(options.measure_count.unwrap_or(1));
            polygon.clamp_inside(&surface);
            polygon
        });
        self.order.push(key);
        self.recordings.insert(key, NoteTimeline::new());
        if let Some(r) = allocated {
            self.allocated.insert(key, r);
        }
        if let Some(polygon) = self.polygons.get(key) {
            log::info!(
                target: "engine",
                "added {} ({} sides, radius {})",
                polygon.name,
                polygon.live().side_count(),
                polygon.live().radius()
            );
        }
        key
    }

    /// Remove a polygon, freeing its id slot and allocator radius.
    pub fn remove_polygon(&mut self, key: PolygonKey) -> Option<Polygon> {
        let polygon = self.polygons.remove(key)?;
        self.order.retain(|k| *k != key);
        self.recordings.remove(key);
        if let Some(radius) = self.allocated.remove(key) {
            self.radii.release(radius);
        }
        if self.selected == Some(key) {
            self.deselect();
        }
        log::info!(target: "engine", "removed {}", polygon.name);
        Some(polygon)
    }

    pub fn polygon(&self, key: PolygonKey) -> Option<&Polygon> {
        self.polygons.get(key)
    }

    /// Polygons in insertion order.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.order.iter().filter_map(|k| self.polygons.get(*k))
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Keys in processing order: largest radius first, ties by insertion.
    pub fn draw_order(&self) -> Vec<PolygonKey> {
        let mut keys = self.order.clone();
        keys.sort_by(|a, b| {
            let ra = self.polygons.get(*a).map_or(0.0, |p| p.live().radius());
            let rb = self.polygons.get(*b).map_or(0.0, |p| p.live().radius());
            rb.total_cmp(&ra)
        });
        keys
    }

    // --- Edits (all land in the active slot) ---

    pub fn set_side_count(&mut self, key: PolygonKey, side_count: u32) -> bool {
        self.edit(key, |p, _| p.set_side_count(side_count))
    }

    pub fn set_radius(&mut self, key: PolygonKey, radius: f64) -> bool {
        self.edit(key, |p, surface| p.set_radius(radius, surface))
    }

    pub fn set_position(&mut self, key: PolygonKey, position: Position) -> bool {
        self.edit(key, |p, surface| {
            p.position = position;
            p.clamp_inside(surface);
        })
    }

    /// Change the measure count and re-derive the processed cycle, so
    /// the new period does not fire a transition on its own.
    pub fn set_measure_count(&mut self, key: PolygonKey, measures: u32) -> bool {
        let (time_base, elapsed) = (self.time_base, self.transport.elapsed());
        self.edit(key, |p, _| {
            p.set_measure_count(measures);
            sequencer::resync(p, time_base, elapsed);
        })
    }

    /// Parse and apply a sequence string; unknown letters are dropped.
    pub fn set_sequence(&mut self, key: PolygonKey, input: &str) -> bool {
        self.edit(key, |p, _| p.set_sequence(Sequence::parse(input)))
    }

    pub fn set_stroke(&mut self, key: PolygonKey, stroke: Color) -> bool {
        self.edit(key, |p, _| p.set_stroke(stroke))
    }

    pub fn set_corner_note(&mut self, key: PolygonKey, corner: usize, hz: f64) -> bool {
        self.polygons.get_mut(key).is_some_and(|p| p.set_corner_note(corner, hz))
    }

    pub fn set_corner_length(&mut self, key: PolygonKey, corner: usize, factor: f64) -> bool {
        self.polygons.get_mut(key).is_some_and(|p| p.set_corner_length(corner, factor))
    }

    /// Make a slot live by hand. Only allowed while paused; the running
    /// sequencer owns slot selection during playback.
    pub fn select_pattern(&mut self, key: PolygonKey, pattern: PatternKey) -> bool {
        if self.transport.is_playing() {
            log::warn!(target: "engine", "pattern {} not selected: transport is running", pattern);
            return false;
        }
        self.edit(key, |p, surface| {
            let current = p.active_key();
            p.save_to(current);
            p.load(pattern, surface);
        })
    }

    /// Copy the live configuration into another slot.
    pub fn copy_pattern(&mut self, key: PolygonKey, to: PatternKey) -> bool {
        self.edit(key, |p, _| p.save_to(to))
    }

    fn edit(&mut self, key: PolygonKey, f: impl FnOnce(&mut Polygon, &Surface)) -> bool {
        match self.polygons.get_mut(key) {
            Some(polygon) => {
                f(polygon, &self.surface);
                true
            }
            None => false,
        }
    }

    // --- Selection ---

    /// Select a polygon for keyboard note entry, starting at its selected
    /// corner (corner 0 if none).
    pub fn select_polygon(&mut self, key: PolygonKey) -> bool {
        let Some(polygon) = self.polygons.get_mut(key) else {
            return false;
        };
        let corner = *polygon.selected_corner.get_or_insert(0);
        self.selected = Some(key);
        self.assign_index = corner;
        true
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<PolygonKey> {
        self.selected
    }

    /// Select a corner of the selected polygon; clears every other corner selection.
    pub fn select_corner(&mut self, corner: usize) -> bool {
        let Some(key) = self.selected else {
            return false;
        };
        if self.polygons.get(key).map_or(true, |p| corner >= p.live().corners().len()) {
            return false;
        }
        for (k, polygon) in self.polygons.iter_mut() {
            polygon.selected_corner = if k == key { Some(corner) } else { None };
        }
        self.assign_index = corner;
        true
    }

    /// Give the next corner of the selected polygon the note `hz`, then
    /// move the cursor on, wrapping after the last corner. Returns the
    /// corner written.
    pub fn assign_next_note(&mut self, hz: f64) -> Option<usize> {
        let polygon = self.polygons.get_mut(self.selected?)?;
        let count = polygon.live().corners().len();
        if count == 0 {
            return None;
        }
        let index = self.assign_index % count;
        polygon.set_corner_note(index, hz);
        polygon.selected_corner = Some(index);
        self.assign_index = (index + 1) % count;
        Some(index)
    }

    // --- Transport ---

    /// Change the global tempo. The next tick loads whatever slot the
    /// new beat position falls in.
    pub fn set_bpm(&mut self, bpm: f64) {
        self.time_base = TimeBase::new(bpm);
    }

    pub fn set_surface(&mut self, surface: Surface) {
        self.surface = surface;
        for polygon in self.polygons.values_mut() {
            polygon.clamp_inside(&surface);
        }
    }

    pub fn play(&mut self) {
        self.transport.play();
    }

    /// Freeze time. Cycle indices and patterns are left untouched.
    pub fn pause(&mut self) {
        self.transport.pause();
    }

    pub fn toggle(&mut self) -> bool {
        self.transport.toggle()
    }

    /// Rewind to the reset offset, re-arm every latch, load each
    /// polygon's first sequence entry and start a new recording.
    pub fn reset(&mut self) {
        self.transport.rewind();
        for polygon in self.polygons.values_mut() {
            polygon.rewind(&self.surface);
        }
        for timeline in self.recordings.values_mut() {
            timeline.clear();
        }
        log::debug!(target: "engine", "transport reset");
    }

    /// Advance the transport by `dt` seconds and evaluate every polygon,
    /// largest first. Tones go to `sink`; notes go to the recording.
    pub fn tick(&mut self, dt: f64, sink: &mut impl ToneSink) -> TickReport {
        let elapsed = self.transport.advance(dt);
        let playing = self.transport.is_playing();
        let time_base = self.time_base;
        let beats = time_base.beats_elapsed(elapsed);
        let mut report = TickReport { elapsed, ..TickReport::default() };

        for key in self.draw_order() {
            let Some(polygon) = self.polygons.get_mut(key) else {
                continue;
            };
            if playing {
                if let Some(t) = sequencer::advance(polygon, &self.surface, time_base, elapsed) {
                    if t.changed() {
                        report.transitions.push((key, t));
                    }
                }
            }

            let rotation = Rotation::at(polygon, time_base, elapsed);
            let crossing = detect_crossing(polygon, &rotation);
            if let Some(d) = crossing.nearest {
                report.nearest_hit = Some(report.nearest_hit.map_or(d, |n| n.min(d)));
            }

            let period = polygon.rotation_period_beats();
            let live = polygon.live();
            for hit in &crossing.onsets {
                let Some(corner) = live.corner(hit.corner) else {
                    continue;
                };
                let tone = tone_for_corner(corner, live, period, time_base);
                if let Some(tone) = tone {
                    sink.play_tone(tone);
                }
                if let Some(note) = live_note_event(corner, live, period, beats) {
                    if let Some(timeline) = self.recordings.get_mut(key) {
                        timeline.push(note);
                    }
                }
                report.onsets.push(Onset { polygon: key, corner: hit.corner, tone });
            }
        }
        report
    }

    // --- Output ---

    /// Render snapshots in processing order.
    pub fn views(&self) -> Vec<PolygonView> {
        self.draw_order()
            .into_iter()
            .filter_map(|key| {
                let polygon = self.polygons.get(key)?;
                let rotation = Rotation::at(polygon, self.time_base, self.transport.elapsed());
                Some(PolygonView::new(polygon, &rotation, self.selected == Some(key)))
            })
            .collect()
    }

    /// Notes recorded live for one polygon since the last reset.
    pub fn recording(&self, key: PolygonKey) -> Option<&NoteTimeline> {
        self.recordings.get(key)
    }

    /// Immutable copy of everything the export reads.
    pub fn export_snapshot(&self) -> ExportSnapshot {
        ExportSnapshot::capture(self.time_base.bpm(), self.polygons())
    }

    pub fn plan_export(&self) -> ExportPlan {
        export::plan_export(&self.export_snapshot())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(120.0, Surface::default())
    }
}

//! Headless controller for polydaw.
//!
//! Provides one API for loading sessions, running the tick loop in real
//! time and exporting MIDI, shared by the CLI and the tests.

mod session;

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use pd_engine::{Engine, ToneSink};

// Re-export common types so callers don't need pd-ir/pd-engine directly.
pub use pd_engine::{ExportPlan, NullSink, Onset, PolygonOptions, TickReport, ToneTrigger};
pub use pd_formats::{read_smf, FormatError, SmfSummary};
pub use pd_ir::{note_label, PatternKey, PolygonKey};

pub use session::{PolygonEntry, SessionFile, SlotEntry};

/// File name used when no export path is given.
pub const DEFAULT_EXPORT_NAME: &str = "polygons_full_sequence.mid";

/// Frame rate of the real-time loop when none is given.
pub const DEFAULT_FPS: f64 = 60.0;

/// Error type for controller operations.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("session write error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("export failed: {0}")]
    Export(#[from] FormatError),
    #[error("audio error: {0}")]
    Audio(#[from] pd_audio::AudioError),
}

/// Totals over a run of ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub onsets: usize,
    /// Onsets that produced a tone
    pub tones: usize,
    pub transitions: usize,
    /// Transport time at the end of the run
    pub elapsed: f64,
}

impl RunSummary {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.onsets += report.onsets.len();
        self.tones += report.onsets.iter().filter(|o| o.tone.is_some()).count();
        self.transitions += report.transitions.len();
        self.elapsed = report.elapsed;
    }
}

/// What [`Controller::write_export`] wrote.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportSummary {
    pub bytes: usize,
    pub tracks: usize,
    pub notes: usize,
    pub measures: u64,
}

/// Headless session controller: owns an engine and drives it.
pub struct Controller {
    engine: Engine,
}

impl Controller {
    pub fn new() -> Self {
        Self { engine: Engine::default() }
    }

    // --- Session management ---

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Replace the engine with one built from `session`, paused at the reset position.
    pub fn load_session(&mut self, session: &SessionFile) {
        self.engine = session.build_engine();
        log::info!(
            target: "session",
            "loaded {} polygons at {} BPM",
            self.engine.polygon_count(),
            self.engine.time_base().bpm()
        );
    }

    pub fn load_session_str(&mut self, text: &str) -> Result<(), ControllerError> {
        let session = SessionFile::from_ron(text)?;
        self.load_session(&session);
        Ok(())
    }

    pub fn load_session_file(&mut self, path: &Path) -> Result<(), ControllerError> {
        let text = fs::read_to_string(path)?;
        self.load_session_str(&text)
    }

    /// Current session as a RON document.
    pub fn session(&self) -> SessionFile {
        SessionFile::capture(&self.engine)
    }

    pub fn save_session_file(&self, path: &Path) -> Result<(), ControllerError> {
        fs::write(path, self.session().to_ron()?)?;
        Ok(())
    }

    // --- Running ---

    /// Tick with a fixed step until `seconds` of transport time have passed.
    /// Starts the transport; does not sleep.
    pub fn run_offline(
        &mut self,
        seconds: f64,
        fps: f64,
        sink: &mut impl ToneSink,
        mut on_tick: impl FnMut(&TickReport),
    ) -> RunSummary {
        let dt = frame_seconds(fps);
        let target = self.engine.elapsed() + seconds.max(0.0);
        let mut summary = RunSummary::default();
        self.engine.play();
        while self.engine.elapsed() < target {
            let report = self.engine.tick(dt, sink);
            summary.record(&report);
            on_tick(&report);
        }
        summary
    }

    /// Tick against the wall clock for `seconds`, sleeping between frames.
    /// Each tick advances by the measured frame time.
    pub fn run_realtime(
        &mut self,
        seconds: f64,
        fps: f64,
        sink: &mut impl ToneSink,
        mut on_tick: impl FnMut(&TickReport),
    ) -> RunSummary {
        let frame = Duration::from_secs_f64(frame_seconds(fps));
        let total = Duration::from_secs_f64(seconds.max(0.0));
        let mut summary = RunSummary::default();

        self.engine.play();
        let start = Instant::now();
        let mut last = start;
        while start.elapsed() < total {
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f64();
            last = now;

            let report = self.engine.tick(dt, sink);
            summary.record(&report);
            on_tick(&report);

            thread::sleep(frame.saturating_sub(now.elapsed()));
        }
        self.engine.pause();
        summary
    }

    /// Run in real time with sound on the default output device.
    #[cfg(feature = "playback")]
    pub fn play_audio(
        &mut self,
        seconds: f64,
        fps: f64,
        on_tick: impl FnMut(&TickReport),
    ) -> Result<RunSummary, ControllerError> {
        use pd_audio::{tone_queue, AudioOutput, CpalOutput};

        let (mut sender, receiver) = tone_queue(256);
        let mut output = CpalOutput::new()?;
        output.build_stream(receiver)?;
        output.start()?;
        let summary = self.run_realtime(seconds, fps, &mut sender, on_tick);
        output.stop()?;
        if sender.dropped() > 0 {
            log::warn!(target: "audio", "{} tones dropped", sender.dropped());
        }
        Ok(summary)
    }

    // --- Export ---

    pub fn plan_export(&self) -> ExportPlan {
        self.engine.plan_export()
    }

    /// The session as Standard MIDI File bytes. The engine is not touched.
    pub fn export_midi(&self) -> Result<Vec<u8>, ControllerError> {
        let plan = self.plan_export();
        Ok(pd_formats::export_to_smf(&plan)?)
    }

    pub fn write_export(&self, path: &Path) -> Result<ExportSummary, ControllerError> {
        let plan = self.plan_export();
        let bytes = pd_formats::export_to_smf(&plan)?;
        fs::write(path, &bytes)?;
        let summary = ExportSummary {
            bytes: bytes.len(),
            tracks: plan.tracks.len(),
            notes: plan.note_count(),
            measures: plan.total_measures,
        };
        log::info!(
            target: "export",
            "wrote {} ({} tracks, {} notes, {} measures)",
            path.display(),
            summary.tracks,
            summary.notes,
            summary.measures
        );
        Ok(summary)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

fn frame_seconds(fps: f64) -> f64 {
    if fps.is_finite() && fps > 0.0 {
        1.0 / fps
    } else {
        1.0 / DEFAULT_FPS
    }
}

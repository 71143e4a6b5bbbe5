//! Integration test: load session fixture → tick → render tones / export → verify output.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use pd_audio::{Frame, ToneSynth};
use pd_formats::{read_smf, DIVISION};
use pd_master::{Controller, NullSink};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sessions").join(name)
}

fn load(name: &str) -> Controller {
    let mut ctrl = Controller::new();
    ctrl.load_session_file(&fixture(name)).unwrap();
    ctrl
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("polydaw-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

// --- phase.ron ---

#[test]
fn phase_loads_paused_on_first_slot() {
    let ctrl = load("phase.ron");
    let engine = ctrl.engine();
    assert_eq!(engine.polygon_count(), 2);
    assert_eq!(engine.time_base().bpm(), 90.0);
    assert!(!engine.is_playing());

    let sides: Vec<u32> = engine.polygons().map(|p| p.live().side_count()).collect();
    assert_eq!(sides, vec![3, 4]);
}

#[test]
fn phase_export_covers_both_cycles() {
    let ctrl = load("phase.ron");
    let plan = ctrl.plan_export();
    assert_eq!(plan.total_measures, 6);

    let summary = read_smf(&ctrl.export_midi().unwrap()).unwrap();
    assert_eq!(summary.division, DIVISION);
    assert_eq!(summary.tempo_micros, Some(666_667));
    // triangle: 3 x 3 corners (A) + 3 x 5 corners (B); square: 2 rotations, one rest
    assert_eq!(summary.tracks[1].notes.len(), 24);
    assert_eq!(summary.tracks[2].notes.len(), 6);
}

#[test]
fn phase_pentagon_plays_in_second_cycle() {
    let mut ctrl = load("phase.ron");
    // one 4-beat rotation at 90 BPM lasts 8/3 s
    let summary = ctrl.run_offline(5.2, 120.0, &mut NullSink, |_| {});
    assert_eq!(summary.transitions, 1);

    let triangle = ctrl.engine().polygons().next().unwrap();
    assert_eq!(triangle.live().side_count(), 5);
}

#[test]
fn phase_tones_render_nonsilent() {
    let mut ctrl = load("phase.ron");
    let mut synth = ToneSynth::new(48_000);
    let mut frames = vec![Frame::silence(); 800];
    let mut peak = 0u16;

    ctrl.engine_mut().play();
    for _ in 0..120 {
        ctrl.engine_mut().tick(1.0 / 60.0, &mut synth);
        synth.render(&mut frames);
        let loudest = frames.iter().map(|f| f.left.unsigned_abs()).max().unwrap_or(0);
        peak = peak.max(loudest);
    }
    assert!(peak > 0, "expected audible output in the first two seconds");
}

// --- binary ---

#[test]
fn cli_export_then_inspect() {
    let dir = scratch("cli");
    let out = dir.join("phase.mid");

    let status = Command::new(env!("CARGO_BIN_EXE_polydaw"))
        .arg("export")
        .arg(fixture("phase.ron"))
        .arg("-o")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let output = Command::new(env!("CARGO_BIN_EXE_polydaw"))
        .arg("inspect")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("Division: 480"), "{}", text);
    assert!(text.contains("Notes:    30"), "{}", text);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn cli_reports_bad_session() {
    let dir = scratch("bad");
    let path = dir.join("broken.ron");
    fs::write(&path, "(tempo: )").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_polydaw"))
        .arg("export")
        .arg(&path)
        .arg("-o")
        .arg(dir.join("never.mid"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.starts_with("polydaw: session parse error"), "{}", err);
    assert!(!dir.join("never.mid").exists());

    fs::remove_dir_all(&dir).unwrap();
}

//! polydaw CLI: run sessions headless, export and inspect MIDI files.

mod cli;

use std::collections::HashMap;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use pd_master::{
    note_label, read_smf, Controller, ControllerError, PolygonKey, RunSummary, SessionFile,
    TickReport,
};

use cli::{Args, Command};

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("polydaw: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), ControllerError> {
    match command {
        Command::Play { session, seconds, fps } => {
            let mut ctrl = open(session.as_deref())?;
            play(&mut ctrl, seconds, fps)
        }
        Command::Export { session, output } => {
            let ctrl = open(session.as_deref())?;
            let written = ctrl.write_export(&output)?;
            println!(
                "Wrote {} ({} tracks, {} notes, {} measures, {} bytes)",
                output.display(),
                written.tracks,
                written.notes,
                written.measures,
                written.bytes
            );
            Ok(())
        }
        Command::Inspect { file } => inspect(&file),
        Command::Init { output } => {
            std::fs::write(&output, SessionFile::demo().to_ron()?)?;
            println!("Wrote demo session to {}", output.display());
            Ok(())
        }
    }
}

fn open(session: Option<&Path>) -> Result<Controller, ControllerError> {
    let mut ctrl = Controller::new();
    match session {
        Some(path) => ctrl.load_session_file(path)?,
        None => ctrl.load_session(&SessionFile::demo()),
    }
    Ok(ctrl)
}

fn play(ctrl: &mut Controller, seconds: f64, fps: f64) -> Result<(), ControllerError> {
    let names: HashMap<PolygonKey, String> = ctrl
        .engine()
        .polygons()
        .map(|p| (p.id(), p.name.to_string()))
        .collect();
    println!("Playing {} polygons for {:.1}s...", names.len(), seconds);

    let on_tick = |report: &TickReport| {
        for onset in &report.onsets {
            let name = names.get(&onset.polygon).map_or("?", String::as_str);
            match onset.tone {
                Some(tone) => println!(
                    "{:8.3}s  {:<12} corner {:<2} {:8.2} Hz {}",
                    report.elapsed,
                    name,
                    onset.corner,
                    tone.frequency,
                    note_label(tone.frequency)
                ),
                None => println!(
                    "{:8.3}s  {:<12} corner {:<2} rest",
                    report.elapsed, name, onset.corner
                ),
            }
        }
        for (key, transition) in &report.transitions {
            let name = names.get(key).map_or("?", String::as_str);
            println!(
                "{:8.3}s  {:<12} cycle {} -> pattern {}",
                report.elapsed, name, transition.cycle, transition.to
            );
        }
    };

    let summary = run_loop(ctrl, seconds, fps, on_tick)?;
    println!(
        "Done: {} onsets ({} tones), {} pattern changes over {} ticks.",
        summary.onsets, summary.tones, summary.transitions, summary.ticks
    );
    Ok(())
}

#[cfg(feature = "playback")]
fn run_loop(
    ctrl: &mut Controller,
    seconds: f64,
    fps: f64,
    on_tick: impl FnMut(&TickReport),
) -> Result<RunSummary, ControllerError> {
    ctrl.play_audio(seconds, fps, on_tick)
}

#[cfg(not(feature = "playback"))]
fn run_loop(
    ctrl: &mut Controller,
    seconds: f64,
    fps: f64,
    on_tick: impl FnMut(&TickReport),
) -> Result<RunSummary, ControllerError> {
    Ok(ctrl.run_realtime(seconds, fps, &mut pd_master::NullSink, on_tick))
}

fn inspect(file: &Path) -> Result<(), ControllerError> {
    let data = std::fs::read(file)?;
    let summary = read_smf(&data)?;

    println!("Format:   {}", summary.format);
    println!("Division: {} ticks per quarter", summary.division);
    match (summary.tempo_micros, summary.bpm()) {
        (Some(micros), Some(bpm)) => println!("Tempo:    {} us/quarter ({:.2} BPM)", micros, bpm),
        _ => println!("Tempo:    (none)"),
    }
    println!("Tracks:   {}", summary.tracks.len());
    for (i, track) in summary.tracks.iter().enumerate() {
        println!(
            "  {:2} {:<16} {:5} notes, ends at tick {}",
            i,
            track.name.as_deref().unwrap_or("-"),
            track.notes.len(),
            track.end_tick
        );
    }
    println!("Notes:    {}", summary.note_count());
    Ok(())
}

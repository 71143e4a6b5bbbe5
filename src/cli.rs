//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pd_master::{DEFAULT_EXPORT_NAME, DEFAULT_FPS};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "polydaw")]
#[command(about = "Rotating-polygon step sequencer", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a session in real time and log every onset
    Play {
        /// Session file (RON); the built-in demo when absent
        session: Option<PathBuf>,

        /// How long to run
        #[arg(long, value_name = "SECONDS", default_value_t = 8.0)]
        seconds: f64,

        /// Tick rate
        #[arg(long, value_name = "FPS", default_value_t = DEFAULT_FPS)]
        fps: f64,
    },

    /// Write the full-sequence MIDI export of a session
    Export {
        /// Session file (RON); the built-in demo when absent
        session: Option<PathBuf>,

        /// Output MIDI file
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_EXPORT_NAME)]
        output: PathBuf,
    },

    /// Print format, division, tempo and note counts of a MIDI file
    Inspect {
        file: PathBuf,
    },

    /// Write the built-in demo session to a file
    Init {
        #[arg(default_value = "session.ron")]
        output: PathBuf,
    },
}

//! Audio output trait and error types.

/// Error type for audio operations.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("device init error: {0}")]
    DeviceInit(String),
    #[error("stream create error: {0}")]
    StreamCreate(String),
    #[error("playback error: {0}")]
    Playback(String),
    #[error("no audio device available")]
    NoDevice,
}

/// Trait for audio output backends.
pub trait AudioOutput {
    fn sample_rate(&self) -> u32;

    /// Start playback.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Stop playback; queued tones are kept.
    fn stop(&mut self) -> Result<(), AudioError>;

    fn is_running(&self) -> bool;
}

/// Output that renders nothing, for headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullOutput {
    running: bool,
}

impl AudioOutput for NullOutput {
    fn sample_rate(&self) -> u32 {
        48_000
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_output_tracks_state() {
        let mut out = NullOutput::default();
        assert!(!out.is_running());
        out.start().unwrap();
        assert!(out.is_running());
        out.stop().unwrap();
        assert!(!out.is_running());
    }

    #[test]
    fn errors_render_one_line() {
        assert_eq!(AudioError::NoDevice.to_string(), "no audio device available");
        assert_eq!(
            AudioError::StreamCreate("busy".into()).to_string(),
            "stream create error: busy"
        );
    }
}

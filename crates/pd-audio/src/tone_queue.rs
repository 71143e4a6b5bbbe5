//! Lock-free handoff of tone triggers from the tick thread to the audio thread.

use pd_engine::{ToneSink, ToneTrigger};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::synth::ToneSynth;

/// Tick-thread end of the queue.
pub struct ToneSender {
    producer: HeapProd<ToneTrigger>,
    dropped: u64,
}

/// Audio-thread end of the queue.
pub struct ToneReceiver {
    consumer: HeapCons<ToneTrigger>,
}

/// Create a single-producer, single-consumer tone queue.
pub fn tone_queue(capacity: usize) -> (ToneSender, ToneReceiver) {
    let (producer, consumer) = HeapRb::<ToneTrigger>::new(capacity.max(1)).split();
    (ToneSender { producer, dropped: 0 }, ToneReceiver { consumer })
}

impl ToneSender {
    /// Tones dropped because the audio thread fell behind.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl ToneSink for ToneSender {
    fn play_tone(&mut self, tone: ToneTrigger) {
        if self.producer.try_push(tone).is_err() {
            self.dropped += 1;
            log::warn!(target: "audio", "tone queue full, dropped {:.1} Hz", tone.frequency);
        }
    }
}

impl ToneReceiver {
    pub fn pending(&self) -> usize {
        self.consumer.occupied_len()
    }

    /// Start every queued tone on `synth`. Returns how many were started.
    pub fn drain_into(&mut self, synth: &mut ToneSynth) -> usize {
        let mut count = 0;
        while let Some(tone) = self.consumer.try_pop() {
            synth.trigger(tone);
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frequency: f64) -> ToneTrigger {
        ToneTrigger { frequency, amplitude: 0.2, duration: 0.1 }
    }

    #[test]
    fn tones_arrive_in_order() {
        let (mut tx, mut rx) = tone_queue(8);
        tx.play_tone(tone(440.0));
        tx.play_tone(tone(880.0));
        assert_eq!(rx.pending(), 2);

        let mut synth = ToneSynth::new(48_000);
        assert_eq!(rx.drain_into(&mut synth), 2);
        assert_eq!(synth.active_voices(), 2);
        assert_eq!(rx.pending(), 0);
    }

    #[test]
    fn full_queue_drops_and_counts() {
        let (mut tx, rx) = tone_queue(2);
        for _ in 0..5 {
            tx.play_tone(tone(440.0));
        }
        assert_eq!(rx.pending(), 2);
        assert_eq!(tx.dropped(), 3);
    }
}

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::anyhow;
use atomic_float::AtomicF64;
use crossbeam_channel::{unbounded, Receiver, Sender};
use level_schema::Millis;

use super::port::AudioPort;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    SetTempo { bpm: u32 },
    Evaluate { source: String },
    Stop,
}

/// An [`AudioPort`] that forwards commands over a channel to whatever drives
/// the audio engine, and reads the audio clock from a shared atomic.
#[derive(Clone)]
pub struct AudioHandle {
    command_tx: Sender<AudioCommand>,
    audio_time_ms: Arc<AtomicF64>,
}

impl AudioHandle {
    pub fn new(audio_time_ms: Arc<AtomicF64>) -> (Self, Receiver<AudioCommand>) {
        let (tx, rx) = unbounded();
        (
            Self {
                command_tx: tx,
                audio_time_ms,
            },
            rx,
        )
    }
}

impl AudioPort for AudioHandle {
    fn now_ms(&self) -> Millis {
        self.audio_time_ms.load(Ordering::Acquire)
    }

    fn set_tempo(&self, bpm: u32) {
        let _ = self.command_tx.send(AudioCommand::SetTempo { bpm });
    }

    fn evaluate(&self, source: &str) -> anyhow::Result<()> {
        self.command_tx
            .send(AudioCommand::Evaluate {
                source: source.to_string(),
            })
            .map_err(|_| anyhow!("audio engine is not running"))
    }

    fn stop(&self) {
        let _ = self.command_tx.send(AudioCommand::Stop);
    }
}

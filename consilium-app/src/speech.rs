//! Stdin-driven speech source.
//!
//! Each line typed on stdin is delivered as a final transcript, which
//! makes the voice override path exercisable without a recogniser: type a
//! line containing the trigger phrase and the overlay switches.

use std::io::BufRead;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use consilium_core::error::Result;
use consilium_core::{SpeechSource, VoiceEvent};
use crossbeam_channel::Sender;
use tracing::debug;

pub struct StdinSpeech {
    running: Arc<AtomicBool>,
}

impl StdinSpeech {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for StdinSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSource for StdinSpeech {
    fn start(&mut self, events: Sender<VoiceEvent>) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        std::thread::Builder::new()
            .name("stdin-speech".into())
            .spawn(move || {
                let _ = events.send(VoiceEvent::Ready);
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }
                    match line {
                        Ok(text) => {
                            if text.trim().is_empty() {
                                continue;
                            }
                            if events.send(VoiceEvent::Final(text)).is_err() {
                                break;
                            }
                        }
                        Err(_) => {
                            let _ = events.send(VoiceEvent::Error(1));
                            break;
                        }
                    }
                }
                debug!("stdin speech thread exiting");
                // The sender drops here, closing the channel for the loop.
            })?;

        Ok(())
    }

    fn stop(&mut self) {
        // A blocking stdin read cannot be interrupted portably; the reader
        // thread notices the flag on its next line (or exits at EOF).
        self.running.store(false, Ordering::SeqCst);
    }
}

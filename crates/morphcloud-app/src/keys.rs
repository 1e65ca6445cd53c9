use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Receiver;
use morphcloud_core::KeyCommand;
use morphcloud_platform::{KeySource, Result};
use tracing::{info, warn};

/// Reads whitespace-separated key names from stdin on a helper thread
/// (`up`, `down`, `q`, `w`, `1`-`9`) and hands them to the frame loop.
#[derive(Default)]
pub struct StdinKeys {
    receiver: Option<Receiver<KeyCommand>>,
    stopped: Arc<AtomicBool>,
}

impl StdinKeys {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeySource for StdinKeys {
    fn start(&mut self) -> Result<()> {
        let (sender, receiver) = crossbeam_channel::unbounded::<KeyCommand>();
        let stopped = Arc::clone(&self.stopped);
        std::thread::Builder::new()
            .name("stdin-keys".into())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    if stopped.load(Ordering::Relaxed) {
                        break;
                    }
                    let Ok(line) = line else { break };
                    for key in line.split_whitespace() {
                        match KeyCommand::from_key(key) {
                            Some(command) => {
                                if sender.send(command).is_err() {
                                    return;
                                }
                            }
                            None => warn!("unknown key {key:?}"),
                        }
                    }
                }
            })?;
        self.receiver = Some(receiver);
        info!("keyboard input: type up/down, q/w or 1-5 and press enter");
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.stopped.store(true, Ordering::Relaxed);
        self.receiver = None;
        Ok(())
    }

    fn poll_key(&mut self) -> Option<KeyCommand> {
        self.receiver.as_ref()?.try_recv().ok()
    }
}

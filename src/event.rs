use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::identity;

pub enum AppEvent {
    Tick,
    Identity(String),
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_tx = tx.clone();

        thread::spawn(move || {
            loop {
                thread::sleep(tick_rate);
                if tick_tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, tx }
    }

    /// Resolve the player's name off-thread; the answer arrives as
    /// [`AppEvent::Identity`].
    pub fn spawn_identity_lookup(&self, url: String, timeout: Duration) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let name = identity::resolve_username(&url, timeout);
            let _ = tx.send(AppEvent::Identity(name));
        });
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }

    pub fn try_next(&self) -> Option<AppEvent> {
        self.rx.try_recv().ok()
    }
}

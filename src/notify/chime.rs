//! Looping notification chime (terminal bell).

use std::io::Write;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Rings the terminal bell every `period` until dropped.
pub struct Chime {
    task: JoinHandle<()>,
}

impl Chime {
    pub fn start(period: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let mut out = std::io::stdout();
                if out.write_all(b"\x07").and_then(|_| out.flush()).is_err() {
                    break;
                }
            }
        });
        Self { task }
    }

    pub fn is_ringing(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Chime {
    fn drop(&mut self) {
        self.task.abort();
    }
}

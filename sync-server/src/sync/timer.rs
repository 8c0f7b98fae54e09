//! Timer facility for the supervisor
//!
//! One-shot and repeating timers that deliver [`Command`]s into the
//! supervisor mailbox. A timer is owned through its [`TimerHandle`]:
//! cancelling the handle (or dropping it) guarantees no further fire.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::Command;

/// Handle to a scheduled timer
///
/// Dropping the handle cancels the timer; a command already delivered
/// to the mailbox may still be observed, which is why the supervisor
/// filters timer commands by run id.
pub struct TimerHandle {
    cancel: CancellationToken,
    _task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Schedule a one-shot command after `delay`
pub fn schedule_once(
    delay: Duration,
    tx: UnboundedSender<Command>,
    command: Command,
) -> TimerHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let task = tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(delay) => {
                let _ = tx.send(command);
            }
        }
    });
    TimerHandle {
        cancel,
        _task: task,
    }
}

/// Schedule a repeating command, first fire after `first_delay`, then
/// every `period`
pub fn schedule_repeating(
    first_delay: Duration,
    period: Duration,
    tx: UnboundedSender<Command>,
    command: Command,
) -> TimerHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let task = tokio::spawn(async move {
        let start = tokio::time::Instant::now() + first_delay;
        let mut interval = tokio::time::interval_at(start, period);
        loop {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = interval.tick() => {
                    if tx.send(command.clone()).is_err() {
                        return;
                    }
                }
            }
        }
    });
    TimerHandle {
        cancel,
        _task: task,
    }
}

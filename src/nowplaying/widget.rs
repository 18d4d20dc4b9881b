use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::SourceKind,
    nowplaying::{Diagnostics, NowPlayingSource, PollState},
};

/// One now-playing widget instance.
pub struct Widget {
    source: Arc<dyn NowPlayingSource>,
    diagnostics: Arc<dyn Diagnostics>,
    interval: Duration,
}

impl Widget {
    pub fn new(
        source: Arc<dyn NowPlayingSource>,
        diagnostics: Arc<dyn Diagnostics>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            diagnostics,
            interval,
        }
    }

    /// Runs a single tick and returns the state it leads to.
    pub async fn poll(&self) -> PollState {
        match self.source.fetch_current_track().await {
            Ok(Some(track)) => PollState::Showing(track),
            Ok(None) => PollState::Hidden(None),
            Err(err) => {
                self.diagnostics.poll_failed(&err);
                PollState::Hidden(Some(err))
            }
        }
    }

    /// Starts polling: once right away, then every interval until the
    /// returned handle is unmounted.
    ///
    /// Ticks never overlap. The loop awaits each poll before it takes the next
    /// tick, and ticks missed while a slow poll was running are skipped.
    pub fn mount(self) -> WidgetHandle {
        let kind = self.source.kind();
        let (tx, rx) = watch::channel(PollState::Loading);
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            self.run(tx, task_cancel).await;
        });

        WidgetHandle {
            kind,
            state: rx,
            cancel,
            task,
        }
    }

    async fn run(self, tx: watch::Sender<PollState>, cancel: CancellationToken) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let next = self.poll().await;
                    // unmounted while the request was in flight
                    if cancel.is_cancelled() {
                        break;
                    }
                    if *tx.borrow() != next {
                        self.diagnostics.state_changed(&next);
                    }
                    tx.send_replace(next);
                }
            }
        }
    }
}

/// Handle to a mounted widget.
pub struct WidgetHandle {
    kind: SourceKind,
    state: watch::Receiver<PollState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WidgetHandle {
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Latest published state.
    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.clone()
    }

    /// Stops the repeating task. A request already in flight is not aborted,
    /// its result is dropped.
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Unmounts and waits for the task to finish.
    pub async fn shutdown(self) {
        self.unmount();
        let _ = self.task.await;
    }
}

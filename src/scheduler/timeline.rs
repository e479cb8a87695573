use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::DataKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Start {
    Immediately,
    AfterPeriod,
}

/// A cancellable refresh loop (or one-shot fetch) running on its own task.
///
/// Stopping drops whatever fetch is in flight. Dropping the handle aborts the
/// task, so a timeline never outlives its owner.
#[derive(Debug)]
pub struct Timeline {
    kind: DataKind,
    stop_tx: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl Timeline {
    pub fn periodic<F, Fut>(kind: DataKind, start: Start, period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let first = match start {
            Start::Immediately => Instant::now(),
            Start::AfterPeriod => Instant::now() + period,
        };

        let join = tokio::spawn(async move {
            let mut interval = interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                let tick = async {
                    interval.tick().await;
                    job().await;
                };
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = tick => {}
                }
            }
            log::debug!("{} timeline stopped", kind);
        });

        Self {
            kind,
            stop_tx: Some(stop_tx),
            join: Some(join),
        }
    }

    pub fn once<Fut>(kind: DataKind, job: Fut) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let join = tokio::spawn(async move {
            tokio::select! {
                _ = stop_rx => log::debug!("{} fetch cancelled", kind),
                _ = job => {}
            }
        });

        Self {
            kind,
            stop_tx: Some(stop_tx),
            join: Some(join),
        }
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map_or(true, |j| j.is_finished())
    }

    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                log::warn!("{} timeline ended abnormally: {}", self.kind, e);
            }
        }
    }
}

impl Drop for Timeline {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }
}

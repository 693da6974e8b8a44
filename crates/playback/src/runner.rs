use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    clock::{ClockState, TickOutcome},
    viewer::Viewer,
};

const MIN_TICK: Duration = Duration::from_millis(1);

/// The map view that follows the animated source.
pub trait Viewport: Send {
    fn recenter(&mut self, latitude: f64, longitude: f64);
}

impl<F> Viewport for F
where
    F: FnMut(f64, f64) + Send,
{
    fn recenter(&mut self, latitude: f64, longitude: f64) {
        self(latitude, longitude)
    }
}

/// Drives the viewer's clock at its configured tick interval until the
/// animation finishes, is stopped through the viewer, or `cancel` fires.
/// The viewer is only locked for the duration of a single tick.
pub async fn run<V: Viewport>(viewer: &Mutex<Viewer>, cancel: CancellationToken, viewport: &mut V) {
    let (tick_interval, settle_delay, state) = {
        let viewer = viewer.lock().await;
        let config = viewer.config();
        (config.tick_interval, config.settle_delay, viewer.clock_state())
    };
    // an earlier run may have been dropped while waiting out the settle delay
    if state == ClockState::Settling {
        settle(viewer, &cancel, settle_delay).await;
        return;
    }
    let mut interval = time::interval(tick_interval.max(MIN_TICK));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                viewer.lock().await.stop_animation();
                return;
            }
            _ = interval.tick() => {}
        }

        let report = viewer.lock().await.tick();
        if let Some((latitude, longitude)) = report.follow {
            viewport.recenter(latitude, longitude);
        }

        match report.outcome {
            TickOutcome::Advanced => {}
            TickOutcome::Idle => return,
            TickOutcome::Exhausted => {
                settle(viewer, &cancel, settle_delay).await;
                return;
            }
        }
    }
}

async fn settle(viewer: &Mutex<Viewer>, cancel: &CancellationToken, delay: Duration) {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => viewer.lock().await.stop_animation(),
        _ = time::sleep(delay) => {
            viewer.lock().await.settle();
        }
    }
}

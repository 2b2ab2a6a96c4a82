//! Background loops: push-event pump, stats polling, graph refresh and
//! layout animation. Loops run for the life of the process.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use argus_common::PushEvent;
use argus_dashboard::graph::REFRESH_INTERVAL;

use crate::state::SharedState;

/// Apply push events one at a time, in arrival order.
pub fn spawn_event_pump(state: SharedState, mut events: mpsc::Receiver<PushEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            state.handle_push(event).await;
        }
        warn!("push channel ended; live updates stopped");
    })
}

/// Refresh counters at startup and then on the variant's interval.
pub fn spawn_stats_poller(state: SharedState) -> JoinHandle<()> {
    let period = state.stats_poller.source().interval();
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            state.refresh_stats().await;
        }
    })
}

/// Reload the graph snapshot at startup and then every refresh interval.
pub fn spawn_graph_refresh(state: SharedState) -> JoinHandle<()> {
    spawn_periodic_graph_reload(state, REFRESH_INTERVAL)
}

fn spawn_periodic_graph_reload(state: SharedState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            state.reload_graph().await;
        }
    })
}

/// Push layout frames while the simulation is warm.
pub fn spawn_graph_animator(state: SharedState) -> JoinHandle<()> {
    let period = state.config.frame_interval();
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            state.step_graph().await;
        }
    })
}

pub fn spawn_all(state: SharedState, events: mpsc::Receiver<PushEvent>) -> Vec<JoinHandle<()>> {
    info!(
        stats_every = ?state.stats_poller.source().interval(),
        graph_every = ?REFRESH_INTERVAL,
        "starting background tasks"
    );
    vec![
        spawn_event_pump(state.clone(), events),
        spawn_stats_poller(state.clone()),
        spawn_graph_refresh(state.clone()),
        spawn_graph_animator(state),
    ]
}

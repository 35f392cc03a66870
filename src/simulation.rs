// Desk simulation: an arrival actor feeds a bounded queue that several desks drain
// concurrently for a fixed wall-clock window.
//
// The queue is a tokio mpsc channel. Desks share the single receiver behind an async
// mutex, so each item is handed to exactly one desk. Once the window closes no new
// work is started, but a desk that already holds an item finishes it.

use std::sync::Arc;

use futures::future::join_all;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::{
    sync::{mpsc, Mutex},
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    config::SimulationConfig,
    coordinator::CheckInCoordinator,
    error::{CheckInError, FeedError},
    fees::Baggage,
};

// A passenger presenting themselves at a desk
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    pub booking_ref: String,
    pub last_name: String,
    pub baggage: Baggage,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeskStats {
    pub desk: usize,
    pub processed: usize,
    pub rejected: usize,
    pub fees: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationSummary {
    pub queued: usize,
    pub unqueued: usize,
    pub checked_in: usize,
    pub rejected: usize,
    // Queued before the window closed but never picked up
    pub left_in_queue: usize,
    pub fees_collected: f64,
    pub desks: Vec<DeskStats>,
    pub report: String,
}

#[derive(Debug, Default)]
struct ArrivalStats {
    queued: usize,
    unqueued: usize,
}

type SharedReceiver = Arc<Mutex<mpsc::Receiver<WorkItem>>>;

pub struct DeskSimulation {
    coordinator: CheckInCoordinator,
    config: SimulationConfig,
}

impl DeskSimulation {
    pub fn new(coordinator: CheckInCoordinator, config: SimulationConfig) -> Result<Self, FeedError> {
        config.validate()?;
        Ok(Self {
            coordinator,
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    // One work item per pending passenger, each carrying randomly sized baggage.
    pub fn pending_work(&self) -> Vec<WorkItem> {
        let mut rng = self.rng();
        let max_dim = self.config.max_bag_dimension;
        let max_weight = self.config.max_bag_weight;

        self.coordinator
            .registry()
            .pending()
            .iter()
            .map(|p| WorkItem {
                booking_ref: p.booking_ref().to_string(),
                last_name: p.last_name().to_string(),
                baggage: Baggage::new(
                    [
                        rng.gen::<f64>() * max_dim,
                        rng.gen::<f64>() * max_dim,
                        rng.gen::<f64>() * max_dim,
                    ],
                    rng.gen::<f64>() * max_weight,
                ),
            })
            .collect()
    }

    // Runs the simulation over every passenger still pending.
    pub async fn run(&self) -> SimulationSummary {
        let work = self.pending_work();
        self.run_items(work).await
    }

    // Runs the simulation over the given arrivals, in random order.
    pub async fn run_items(&self, work: Vec<WorkItem>) -> SimulationSummary {
        let deadline = Instant::now() + self.config.window();
        let (tx, rx) = mpsc::channel::<WorkItem>(self.config.queue_capacity);
        let rx: SharedReceiver = Arc::new(Mutex::new(rx));

        info!(
            desks = self.config.desk_count,
            waiting = work.len(),
            window_ms = self.config.window_ms,
            "simulation started"
        );

        let arrivals = tokio::spawn(arrival_loop(
            work,
            tx,
            self.config.clone(),
            self.rng(),
            deadline,
        ));

        let desks = (0..self.config.desk_count).map(|desk| {
            tokio::spawn(desk_loop(
                desk,
                self.coordinator.clone(),
                rx.clone(),
                deadline,
            ))
        });
        let desk_results = join_all(desks).await;

        let arrival_stats = match arrivals.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "arrival task failed");
                ArrivalStats::default()
            }
        };

        let mut summary = SimulationSummary {
            queued: arrival_stats.queued,
            unqueued: arrival_stats.unqueued,
            ..Default::default()
        };

        for result in desk_results {
            match result {
                Ok(stats) => {
                    summary.checked_in += stats.processed;
                    summary.rejected += stats.rejected;
                    summary.fees_collected += stats.fees;
                    summary.desks.push(stats);
                }
                Err(e) => warn!(error = %e, "desk task failed"),
            }
        }

        summary.left_in_queue = drain_leftovers(&rx).await;

        summary.report = self.coordinator.generate_report();

        info!(
            queued = summary.queued,
            unqueued = summary.unqueued,
            checked_in = summary.checked_in,
            rejected = summary.rejected,
            left_in_queue = summary.left_in_queue,
            fees = summary.fees_collected,
            "simulation complete"
        );
        summary
    }
}

// Adds one random waiting passenger to the queue with the configured probability per
// tick, until everyone is queued or the window closes. Dropping `tx` on exit lets the
// desks stop once the queue drains.
async fn arrival_loop(
    mut waiting: Vec<WorkItem>,
    tx: mpsc::Sender<WorkItem>,
    config: SimulationConfig,
    mut rng: StdRng,
    deadline: Instant,
) -> ArrivalStats {
    let mut stats = ArrivalStats::default();
    let mut ticker = time::interval(config.tick());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while !waiting.is_empty() {
        ticker.tick().await;
        if Instant::now() >= deadline {
            break;
        }
        if !rng.gen_bool(config.arrival_probability) {
            continue;
        }

        let item = waiting.swap_remove(rng.gen_range(0..waiting.len()));
        let booking_ref = item.booking_ref.clone();

        match time::timeout_at(deadline, tx.send(item)).await {
            Ok(Ok(())) => {
                stats.queued += 1;
                debug!(booking_ref = %booking_ref, queued = stats.queued, "passenger joined queue");
            }
            // Every desk has gone
            Ok(Err(mpsc::error::SendError(item))) => {
                waiting.push(item);
                break;
            }
            // Window closed while the queue was full
            Err(_) => {
                stats.unqueued += 1;
                break;
            }
        }
    }

    stats.unqueued += waiting.len();
    stats
}

async fn desk_loop(
    desk: usize,
    coordinator: CheckInCoordinator,
    rx: SharedReceiver,
    deadline: Instant,
) -> DeskStats {
    let mut stats = DeskStats {
        desk,
        ..Default::default()
    };

    loop {
        let next = {
            let mut rx = rx.lock().await;
            // The lock wait is unbounded, and recv() yields a queued item even
            // after the deadline has passed.
            if Instant::now() >= deadline {
                break;
            }
            time::timeout_at(deadline, rx.recv()).await
        };

        let item = match next {
            Ok(Some(item)) => item,
            // Queue closed and drained
            Ok(None) => break,
            // Window closed
            Err(_) => break,
        };

        match serve(&coordinator, &item) {
            Ok(fee) => {
                stats.processed += 1;
                stats.fees += fee;
                info!(desk, booking_ref = %item.booking_ref, fee, "checked in");
            }
            Err(e) => {
                stats.rejected += 1;
                info!(desk, booking_ref = %item.booking_ref, reason = %e, "check-in rejected");
            }
        }

        tokio::task::yield_now().await;
    }

    debug!(desk, processed = stats.processed, rejected = stats.rejected, "desk closed");
    stats
}

// Empties whatever is still queued once the desks have closed
async fn drain_leftovers(rx: &SharedReceiver) -> usize {
    let mut rx = rx.lock().await;
    let mut left = 0;
    while rx.try_recv().is_ok() {
        left += 1;
    }
    left
}

// The desk's exchange with the coordinator for one passenger
fn serve(coordinator: &CheckInCoordinator, item: &WorkItem) -> Result<f64, CheckInError> {
    if !coordinator.check_details(&item.booking_ref, &item.last_name)? {
        return Err(CheckInError::CheckInFailed {
            reference: item.booking_ref.clone(),
            reason: "last name does not match booking".to_string(),
        });
    }

    coordinator
        .process_baggage(&item.booking_ref, &item.baggage)
        .map(|assessment| assessment.fee)
}

//! # Broadcaster
//!
//! Picks one ordering node per envelope and hands the envelope to it.
//!
//! Selection is a swappable [`OrdererSelector`]. None of the selectors fail
//! over: if the chosen node reports an error, that error is what the caller
//! sees.

use crate::config::OrdererSelection;
use crate::domain::entities::Envelope;
use crate::domain::errors::{Result, SubmissionError};
use crate::ports::handle::BroadcastHandle;
use crate::ports::outbound::{Orderer, SchedulerHint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Chooses which orderer receives an envelope.
pub trait OrdererSelector: Send + Sync + fmt::Debug {
    /// Index into `orderers`, or `None` if no orderer is eligible.
    ///
    /// Never called with an empty slice.
    fn select(&self, orderers: &[Arc<dyn Orderer>]) -> Option<usize>;
}

/// Uniform random choice.
pub struct RandomSelector {
    rng: Option<Mutex<StdRng>>,
}

impl RandomSelector {
    /// Random choice from the thread-local generator.
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Reproducible choice sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RandomSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomSelector")
            .field("seeded", &self.rng.is_some())
            .finish()
    }
}

impl OrdererSelector for RandomSelector {
    fn select(&self, orderers: &[Arc<dyn Orderer>]) -> Option<usize> {
        if orderers.is_empty() {
            return None;
        }
        let index = match &self.rng {
            Some(rng) => match rng.lock() {
                Ok(mut rng) => rng.gen_range(0..orderers.len()),
                Err(poisoned) => poisoned.into_inner().gen_range(0..orderers.len()),
            },
            None => rand::thread_rng().gen_range(0..orderers.len()),
        };
        Some(index)
    }
}

/// Cycles through the orderers in order.
#[derive(Debug, Default)]
pub struct RoundRobinSelector {
    next: AtomicUsize,
}

impl OrdererSelector for RoundRobinSelector {
    fn select(&self, orderers: &[Arc<dyn Orderer>]) -> Option<usize> {
        if orderers.is_empty() {
            return None;
        }
        Some(self.next.fetch_add(1, Ordering::Relaxed) % orderers.len())
    }
}

/// First orderer that reports itself healthy.
#[derive(Debug, Default)]
pub struct FirstHealthySelector;

impl OrdererSelector for FirstHealthySelector {
    fn select(&self, orderers: &[Arc<dyn Orderer>]) -> Option<usize> {
        orderers.iter().position(|orderer| orderer.is_healthy())
    }
}

/// Build the selector named by the configuration.
pub fn selector_for(selection: OrdererSelection) -> Arc<dyn OrdererSelector> {
    match selection {
        OrdererSelection::Random => Arc::new(RandomSelector::new()),
        OrdererSelection::RoundRobin => Arc::new(RoundRobinSelector::default()),
        OrdererSelection::FirstHealthy => Arc::new(FirstHealthySelector),
    }
}

/// Submits envelopes to the ordering service.
#[derive(Clone, Debug)]
pub struct Broadcaster {
    selector: Arc<dyn OrdererSelector>,
}

impl Broadcaster {
    pub fn new(selector: Arc<dyn OrdererSelector>) -> Self {
        Self { selector }
    }

    /// Send `envelope` to exactly one orderer.
    ///
    /// Fails without contacting anything when `orderers` is empty or the
    /// selector finds no eligible node.
    pub fn broadcast(
        &self,
        envelope: Envelope,
        orderers: &[Arc<dyn Orderer>],
        scheduler: SchedulerHint,
    ) -> Result<BroadcastHandle> {
        if orderers.is_empty() {
            return Err(SubmissionError::NoOrderers);
        }

        let index = self
            .selector
            .select(orderers)
            .filter(|&i| i < orderers.len())
            .ok_or(SubmissionError::NoOrderers)?;
        let orderer = &orderers[index];

        debug!(
            orderer = orderer.endpoint(),
            candidates = orderers.len(),
            "Orderer selected"
        );
        info!(
            orderer = orderer.endpoint(),
            payload_len = envelope.payload.len(),
            "Broadcasting envelope"
        );

        Ok(orderer.broadcast(envelope, scheduler))
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(Arc::new(RandomSelector::new()))
    }
}

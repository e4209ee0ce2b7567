//! # Proposal Fan-Out
//!
//! Sends one signed proposal to every endorsing peer concurrently and
//! publishes the combined outcome into an endorsement slot.
//!
//! Responses are recorded in the order they arrive. The first peer error
//! publishes an error item; later results are dropped.

use crate::application::collector::{endorsement_slot, EndorsementPublisher, EndorsementStream};
use crate::domain::entities::SignedProposal;
use crate::ports::outbound::{Peer, SchedulerHint};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Dispatch `proposal` to `peers` and return the stream the collector waits on.
pub fn dispatch_proposal(
    proposal: SignedProposal,
    peers: Vec<Arc<dyn Peer>>,
    scheduler: SchedulerHint,
) -> EndorsementStream {
    let (publisher, stream) = endorsement_slot();

    let runtime = match scheduler.or_else(|| Handle::try_current().ok()) {
        Some(runtime) => runtime,
        None => {
            warn!("No async runtime available for proposal fan-out");
            let _ = publisher.publish_error("no async runtime available for proposal fan-out");
            return stream;
        }
    };

    runtime.spawn(gather(proposal, peers, publisher));
    stream
}

async fn gather(
    proposal: SignedProposal,
    peers: Vec<Arc<dyn Peer>>,
    publisher: EndorsementPublisher,
) {
    let proposal = Arc::new(proposal);
    let expected = peers.len();

    let mut pending: FuturesUnordered<_> = peers
        .into_iter()
        .map(|peer| {
            let proposal = Arc::clone(&proposal);
            async move {
                let result = peer.send_proposal(&proposal).await;
                (peer, result)
            }
        })
        .collect();

    let mut responses = Vec::with_capacity(expected);
    while let Some((peer, result)) = pending.next().await {
        match result {
            Ok(response) => {
                debug!(
                    peer = peer.endpoint(),
                    status = response.response.status,
                    "Endorsement received"
                );
                responses.push(response);
            }
            Err(e) => {
                warn!(peer = peer.endpoint(), error = %e, "Endorsement request failed");
                let _ = publisher.publish_error(e.to_string());
                return;
            }
        }
    }

    let _ = publisher.publish_responses(responses);
}

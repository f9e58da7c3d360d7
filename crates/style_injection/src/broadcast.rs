//! Content-addressed fan-out of CSS fragments to independently registered
//! consumers.

use log::trace;
use std::collections::HashSet;

use crate::hash::{FragmentHash, fragment_hash};

struct Consumer {
    callback: Box<dyn FnMut(&str)>,
    delivered: HashSet<FragmentHash>,
}

/// A feed of CSS fragments. Publishing appends to an unbounded history;
/// consumers registered at any point replay that history, and every delivery
/// is gated per consumer by content hash, so each distinct payload reaches
/// each consumer at most once no matter how often it is published or when
/// the consumer signed up.
#[derive(Default)]
pub struct CssFeed {
    history: Vec<String>,
    consumers: Vec<Consumer>,
}

impl CssFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a fragment: the history grows unconditionally (duplicate
    /// submissions are legitimate), then the fragment is offered to every
    /// live consumer through its dedupe gate.
    pub fn publish(&mut self, css: &str) {
        self.history.push(css.to_owned());
        let hash = fragment_hash(css);
        for consumer in &mut self.consumers {
            deliver(consumer, hash, css);
        }
    }

    /// Register a consumer: the full history is replayed through the same
    /// per-consumer gate before the consumer joins the live set, so late
    /// registration observes everything published so far, deduped.
    pub fn register_consumer(&mut self, callback: impl FnMut(&str) + 'static) {
        let mut consumer = Consumer {
            callback: Box::new(callback),
            delivered: HashSet::new(),
        };
        for css in &self.history {
            deliver(&mut consumer, fragment_hash(css), css);
        }
        self.consumers.push(consumer);
    }

    /// Number of fragments ever published, duplicates included.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Number of registered consumers.
    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }
}

fn deliver(consumer: &mut Consumer, hash: FragmentHash, css: &str) {
    if consumer.delivered.insert(hash) {
        trace!("delivering fragment {hash} ({} bytes)", css.len());
        (consumer.callback)(css);
    }
}

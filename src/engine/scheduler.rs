use std::collections::HashSet;

use eframe::egui::Vec2;
use tracing::{debug, info, warn};

use crate::network::{NetworkGraph, NodeKey, TransferEvent};

use super::shown::ShownStore;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerConfig {
    pub batch_cap: usize,
    pub stagger_secs: f64,
    pub edge_duration_secs: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_cap: 8,
            stagger_secs: 0.8,
            edge_duration_secs: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryStatus {
    Queued,
    Animating,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowDirection {
    OrgToUser,
    UserToOrg,
    Other,
}

impl FlowDirection {
    fn between(source: NodeKey, target: NodeKey) -> Self {
        match (source, target) {
            (NodeKey::Org(_), NodeKey::User(_)) => Self::OrgToUser,
            (NodeKey::User(_), NodeKey::Org(_)) => Self::UserToOrg,
            _ => Self::Other,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationEntry {
    pub tx_id: String,
    pub source_key: NodeKey,
    pub target_key: NodeKey,
    pub source: Vec2,
    pub target: Vec2,
    pub amount: f64,
    pub direction: FlowDirection,
    pub status: EntryStatus,
    pub release_at: f64,
    pub started_at: Option<f64>,
}

impl AnimationEntry {
    fn progress(&self, now: f64, duration: f64) -> f64 {
        match self.started_at {
            Some(started_at) if duration > 0.0 => ((now - started_at) / duration).clamp(0.0, 1.0),
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    /// Eased animation phase in `[0, 1]`.
    pub fn phase(&self, now: f64, duration: f64) -> f32 {
        let t = self.progress(now, duration);
        (1.0 - (1.0 - t).powi(3)) as f32
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub queued: usize,
    pub dropped: usize,
    pub unseen: usize,
}

pub struct TransferScheduler<S: ShownStore> {
    config: SchedulerConfig,
    store: S,
    shown: HashSet<String>,
    queue: Vec<AnimationEntry>,
}

impl<S: ShownStore> TransferScheduler<S> {
    pub fn new(store: S, config: SchedulerConfig) -> Self {
        let shown = store.load().unwrap_or_else(|error| {
            warn!(%error, "could not load shown transfers, starting empty");
            HashSet::new()
        });
        info!(count = shown.len(), "loaded shown transfers");

        Self {
            config,
            store,
            shown,
            queue: Vec::new(),
        }
    }

    pub fn queue(&self) -> &[AnimationEntry] {
        &self.queue
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    #[cfg(test)]
    pub fn is_shown(&self, tx_id: &str) -> bool {
        self.shown.contains(tx_id)
    }

    pub fn shown_count(&self) -> usize {
        self.shown.len()
    }

    fn is_queued(&self, tx_id: &str) -> bool {
        self.queue.iter().any(|entry| entry.tx_id == tx_id)
    }

    pub fn ingest(
        &mut self,
        transfers: &[TransferEvent],
        graph: &NetworkGraph,
        now: f64,
    ) -> IngestReport {
        let mut unseen = transfers
            .iter()
            .filter(|transfer| {
                !self.shown.contains(&transfer.tx_id) && !self.is_queued(&transfer.tx_id)
            })
            .collect::<Vec<_>>();
        unseen.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        // Keeps the newest record per hash, wherever the duplicates sit.
        let mut hashes = HashSet::new();
        unseen.retain(|transfer| hashes.insert(transfer.tx_id.as_str()));

        let mut report = IngestReport {
            unseen: unseen.len(),
            ..IngestReport::default()
        };

        let batch = unseen
            .into_iter()
            .take(self.config.batch_cap)
            .collect::<Vec<_>>();

        let mut release_at = self
            .queue
            .last()
            .map(|entry| entry.release_at + self.config.stagger_secs)
            .unwrap_or(now)
            .max(now);

        // Newest transfers win the batch slots, but play back oldest first.
        for transfer in batch.into_iter().rev() {
            let endpoints = (
                graph.resolve_position(transfer.from_address.as_deref()),
                graph.resolve_position(transfer.to_address.as_deref()),
            );
            let (Some((source_key, source)), Some((target_key, target))) = endpoints else {
                debug!(tx_id = %transfer.tx_id, "dropping transfer with unresolved wallet");
                report.dropped += 1;
                continue;
            };

            self.queue.push(AnimationEntry {
                tx_id: transfer.tx_id.clone(),
                source_key,
                target_key,
                source,
                target,
                amount: transfer.amount,
                direction: FlowDirection::between(source_key, target_key),
                status: EntryStatus::Queued,
                release_at,
                started_at: None,
            });
            release_at += self.config.stagger_secs;
            report.queued += 1;
        }

        if report.queued > 0 {
            debug!(
                queued = report.queued,
                dropped = report.dropped,
                "scheduled transfer animations"
            );
        }
        report
    }

    /// Starts every queued entry whose release time has passed and returns
    /// their ids.
    pub fn advance(&mut self, now: f64) -> Vec<String> {
        let mut started = Vec::new();
        for entry in &mut self.queue {
            if entry.status == EntryStatus::Queued && entry.release_at <= now {
                entry.status = EntryStatus::Animating;
                entry.started_at = Some(now);
                started.push(entry.tx_id.clone());
            }
        }
        started
    }

    pub fn finished(&self, now: f64) -> Vec<String> {
        self.queue
            .iter()
            .filter(|entry| {
                entry.status == EntryStatus::Animating
                    && entry.progress(now, self.config.edge_duration_secs) >= 1.0
            })
            .map(|entry| entry.tx_id.clone())
            .collect()
    }

    pub fn phase(&self, entry: &AnimationEntry, now: f64) -> f32 {
        entry.phase(now, self.config.edge_duration_secs)
    }

    /// Marks an animating entry as shown. Returns `false` when `tx_id` is not
    /// currently animating, which makes repeated completion reports no-ops.
    pub fn complete(&mut self, tx_id: &str) -> bool {
        let Some(index) = self
            .queue
            .iter()
            .position(|entry| entry.tx_id == tx_id && entry.status == EntryStatus::Animating)
        else {
            return false;
        };

        self.queue.remove(index);
        if self.shown.insert(tx_id.to_owned())
            && let Err(error) = self.store.save(&self.shown)
        {
            warn!(%error, tx_id, "could not persist shown transfers");
        }
        true
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

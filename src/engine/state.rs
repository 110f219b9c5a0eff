use std::collections::HashSet;

use eframe::egui::Vec2;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::info;

use crate::api::Snapshot;
use crate::network::{Canvas, NetworkGraph, NodeKey, NodeRole};
use crate::util::{format_amount, format_balance};

use super::demo::{DemoAction, DemoOutcome};
use super::scheduler::{EntryStatus, FlowDirection, SchedulerConfig, TransferScheduler};
use super::shown::ShownStore;
use super::viewport::{ViewTransform, Viewport};

const PULSE_SECS: f64 = 2.0;

#[derive(Debug, PartialEq)]
pub enum Action {
    SnapshotLoaded(Snapshot),
    FetchFailed(String),
    DemoSubmitted(DemoAction),
    DemoFinished(DemoOutcome),
    Hover(Option<NodeKey>),
    Select(Option<NodeKey>),
    Search(String),
    BeginDrag,
    DragBy(Vec2),
    EndDrag,
    Zoom(f32),
    ResetView,
    AnimationCompleted(String),
    DismissError,
    Dispose,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Highlight {
    Normal,
    Dimmed,
    SearchMatch,
    Involved,
    Pulsing,
    Hovered,
    Selected,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameNode {
    pub key: NodeKey,
    pub role: NodeRole,
    pub label: String,
    pub sublabel: String,
    pub position: Vec2,
    pub highlight: Highlight,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameEdge {
    pub tx_id: String,
    pub source: Vec2,
    pub target: Vec2,
    pub amount: f64,
    pub direction: FlowDirection,
    pub phase: f32,
}

impl FrameEdge {
    pub fn label(&self) -> String {
        format!("{} SOV", format_amount(self.amount))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub nodes: Vec<FrameNode>,
    pub edges: Vec<FrameEdge>,
    pub transform: ViewTransform,
}

pub struct EngineState<S: ShownStore> {
    graph: NetworkGraph,
    scheduler: TransferScheduler<S>,
    viewport: Viewport,
    hovered: Option<NodeKey>,
    selected: Option<NodeKey>,
    pulse: Option<(i64, f64)>,
    search: String,
    search_matches: HashSet<NodeKey>,
    error: Option<String>,
    notice: Option<String>,
    snapshot_count: u64,
    disposed: bool,
}

impl<S: ShownStore> EngineState<S> {
    pub fn new(store: S, config: SchedulerConfig, canvas: Canvas) -> Self {
        Self {
            graph: NetworkGraph::empty(canvas),
            scheduler: TransferScheduler::new(store, config),
            viewport: Viewport::new(canvas),
            hovered: None,
            selected: None,
            pulse: None,
            search: String::new(),
            search_matches: HashSet::new(),
            error: None,
            notice: None,
            snapshot_count: 0,
            disposed: false,
        }
    }

    pub fn graph(&self) -> &NetworkGraph {
        &self.graph
    }

    pub fn scheduler(&self) -> &TransferScheduler<S> {
        &self.scheduler
    }

    pub fn hovered(&self) -> Option<NodeKey> {
        self.hovered
    }

    pub fn selected(&self) -> Option<NodeKey> {
        self.selected
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn snapshot_count(&self) -> u64 {
        self.snapshot_count
    }

    pub fn animations_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    #[cfg(test)]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn apply(&mut self, action: Action, now: f64) {
        if self.disposed {
            return;
        }

        match action {
            Action::SnapshotLoaded(snapshot) => self.load_snapshot(&snapshot, now),
            Action::FetchFailed(error) => self.error = Some(error),
            Action::DemoSubmitted(action) => {
                if let DemoAction::Purchase { org_id, .. } = action {
                    self.pulse = Some((org_id, now + PULSE_SECS));
                }
                self.selected = Some(NodeKey::Org(action.org_id()));
            }
            Action::DemoFinished(outcome) => match outcome.result {
                Ok(summary) => self.notice = Some(summary),
                Err(error) => {
                    if self.pulse.is_some_and(|(org_id, _)| org_id == outcome.action.org_id()) {
                        self.pulse = None;
                    }
                    self.error = Some(error);
                }
            },
            Action::Hover(key) => self.hovered = key.filter(|key| self.graph.contains(*key)),
            Action::Select(key) => self.selected = key.filter(|key| self.graph.contains(*key)),
            Action::Search(query) => {
                self.search = query;
                self.refresh_search_matches();
            }
            Action::BeginDrag => self.viewport.begin_drag(),
            Action::DragBy(movement) => self.viewport.drag_by(movement),
            Action::EndDrag => self.viewport.end_drag(),
            Action::Zoom(delta) => self.viewport.zoom_by(delta),
            Action::ResetView => self.viewport.reset(),
            Action::AnimationCompleted(tx_id) => {
                self.scheduler.complete(&tx_id);
            }
            Action::DismissError => self.error = None,
            Action::Dispose => {
                self.scheduler.clear();
                self.hovered = None;
                self.pulse = None;
                self.disposed = true;
            }
        }
    }

    fn load_snapshot(&mut self, snapshot: &Snapshot, now: f64) {
        self.graph = NetworkGraph::from_snapshot(snapshot, self.graph.canvas());
        self.hovered = self.hovered.filter(|key| self.graph.contains(*key));
        self.selected = self.selected.filter(|key| self.graph.contains(*key));
        self.error = None;
        self.snapshot_count += 1;
        self.refresh_search_matches();

        let report = self.scheduler.ingest(&snapshot.transfers, &self.graph, now);
        info!(
            orgs = self.graph.orgs().len(),
            users = self.graph.users().len(),
            transfers = snapshot.transfers.len(),
            unseen = report.unseen,
            queued = report.queued,
            dropped = report.dropped,
            "network snapshot loaded"
        );
    }

    fn refresh_search_matches(&mut self) {
        self.search_matches.clear();
        let query = self.search.trim();
        if query.is_empty() {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let keys = self
            .graph
            .orgs()
            .iter()
            .map(|org| NodeKey::Org(org.id))
            .chain(self.graph.users().iter().map(|user| NodeKey::User(user.id)));
        for key in keys {
            if matcher.fuzzy_match(&self.graph.label(key), query).is_some() {
                self.search_matches.insert(key);
            }
        }
    }

    /// Advances viewport smoothing and releases due animations. Returns
    /// whether anything is still moving.
    pub fn tick(&mut self, now: f64, dt: f32) -> bool {
        if self.disposed {
            return false;
        }

        if self.pulse.is_some_and(|(_, until)| until <= now) {
            self.pulse = None;
        }

        let viewport_moving = self.viewport.step(dt);
        self.scheduler.advance(now);
        viewport_moving || !self.scheduler.is_idle() || self.pulse.is_some()
    }

    pub fn finished_animations(&self, now: f64) -> Vec<String> {
        self.scheduler.finished(now)
    }

    fn highlight(&self, key: NodeKey, involved: &HashSet<NodeKey>) -> Highlight {
        if self.selected == Some(key) {
            Highlight::Selected
        } else if self.hovered == Some(key) {
            Highlight::Hovered
        } else if matches!(
            (key, self.pulse),
            (NodeKey::Org(id), Some((pulsing, _))) if id == pulsing
        ) {
            Highlight::Pulsing
        } else if involved.contains(&key) {
            Highlight::Involved
        } else if self.search_matches.contains(&key) {
            Highlight::SearchMatch
        } else if !self.search.trim().is_empty() {
            Highlight::Dimmed
        } else {
            Highlight::Normal
        }
    }

    pub fn frame(&self, now: f64) -> Frame {
        let animating = self
            .scheduler
            .queue()
            .iter()
            .filter(|entry| entry.status == EntryStatus::Animating)
            .collect::<Vec<_>>();

        let involved = animating
            .iter()
            .flat_map(|entry| [entry.source_key, entry.target_key])
            .collect::<HashSet<_>>();

        let mut nodes = Vec::with_capacity(self.graph.node_count());
        for org in self.graph.orgs() {
            let key = NodeKey::Org(org.id);
            nodes.push(FrameNode {
                key,
                role: NodeRole::Organization,
                label: org.name.clone(),
                sublabel: format!("Company {}", org.id),
                position: org.position,
                highlight: self.highlight(key, &involved),
            });
        }
        for user in self.graph.users() {
            let key = NodeKey::User(user.id);
            nodes.push(FrameNode {
                key,
                role: NodeRole::User,
                label: "User".to_owned(),
                sublabel: format!("#{}", user.user_id),
                position: user.position,
                highlight: self.highlight(key, &involved),
            });
        }

        let edges = animating
            .into_iter()
            .map(|entry| FrameEdge {
                tx_id: entry.tx_id.clone(),
                source: entry.source,
                target: entry.target,
                amount: entry.amount,
                direction: entry.direction,
                phase: self.scheduler.phase(entry, now),
            })
            .collect();

        Frame {
            nodes,
            edges,
            transform: self.viewport.transform(),
        }
    }

    pub fn tooltip(&self, key: NodeKey) -> Option<Vec<String>> {
        match key {
            NodeKey::Org(id) => {
                let org = self.graph.org(id)?;
                Some(vec![
                    org.name.clone(),
                    format!("Company ID: {}", org.id),
                    format!("Created: {}", org.created_at.format("%Y-%m-%d")),
                    format!("Treasury: {} SOV", format_balance(self.graph.org_balance(id))),
                ])
            }
            NodeKey::User(id) => {
                let user = self.graph.user(id)?;
                Some(vec![
                    format!("User #{}", user.user_id),
                    self.graph.owner_name(user).to_owned(),
                    format!("{} SOV", format_balance(user.balance)),
                ])
            }
        }
    }
}

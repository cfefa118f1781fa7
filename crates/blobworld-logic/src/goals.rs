//! Goal stack: urgency-ranked, interruptible behaviour scheduling.
//!
//! Every blob owns a [`GoalStack`]. Exactly one goal is active at a time.
//! Goals are ranked by urgency (highest first), then by delegation depth
//! (subtasks above their parents), then by age (older first). A newly ranked
//! goal only takes over when its urgency is strictly greater than the running
//! goal's and the running goal allows interruption; the displaced goal is
//! suspended and resumes once it ranks first again.
//!
//! A running goal can delegate a subtask. The parent waits until the subtask
//! completes; a failed subtask fails its parent as well. The idle goal sits at
//! the bottom of every stack and can never be removed.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::surface::{Resource, TileId};

pub type GoalId = u32;

/// Urgency at which even an attack gives way.
pub const ATTACK_OVERRIDE_URGENCY: f32 = 1.0;

/// What a goal is trying to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GoalKind {
    Idle,
    Eat,
    Drink,
    /// Chase and hurt another blob (by stable blob id)
    Attack { target: u64 },
    /// Walk somewhere nearby; destination is chosen when the stroll starts
    Stroll { destination: Option<TileId> },
    LocateResource { resource: Resource },
    LookAround,
}

impl GoalKind {
    /// Whether a goal with `urgency` may displace this one.
    pub fn interruptible_by(&self, urgency: f32) -> bool {
        match self {
            GoalKind::Attack { .. } => urgency >= ATTACK_OVERRIDE_URGENCY,
            _ => true,
        }
    }

    /// Same behaviour, ignoring per-run details like a stroll destination.
    pub fn same_behaviour(&self, other: &GoalKind) -> bool {
        match (self, other) {
            (GoalKind::Attack { target: a }, GoalKind::Attack { target: b }) => a == b,
            (
                GoalKind::LocateResource { resource: a },
                GoalKind::LocateResource { resource: b },
            ) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }

    pub fn label(&self) -> String {
        match self {
            GoalKind::Idle => "idle".into(),
            GoalKind::Eat => "eat".into(),
            GoalKind::Drink => "drink".into(),
            GoalKind::Attack { target } => format!("attack #{}", target),
            GoalKind::Stroll { .. } => "stroll".into(),
            GoalKind::LocateResource { resource } => format!("locate {}", resource.label()),
            GoalKind::LookAround => "look around".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalState {
    /// Currently running
    Active,
    /// Queued, never started
    Pending,
    /// Was running, displaced by a more urgent goal
    Suspended,
    /// Blocked on a delegated subtask
    Waiting,
}

/// Why a goal gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalFailure {
    NothingFound,
    NoPath,
    TargetLost,
    SubtaskFailed,
}

impl GoalFailure {
    pub fn label(self) -> &'static str {
        match self {
            GoalFailure::NothingFound => "nothing found",
            GoalFailure::NoPath => "no path",
            GoalFailure::TargetLost => "target lost",
            GoalFailure::SubtaskFailed => "subtask failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub kind: GoalKind,
    pub urgency: f32,
    pub state: GoalState,
    pub parent: Option<GoalId>,
    /// Delegation depth, 0 for root goals
    pub depth: u32,
    seq: u64,
}

/// Scheduling changes, drained by the caller for logging and history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GoalEvent {
    Started { id: GoalId, kind: GoalKind },
    Resumed { id: GoalId, kind: GoalKind },
    Interrupted { id: GoalId, by: GoalId },
    Delegated { parent: GoalId, child: GoalId },
    Completed { id: GoalId, kind: GoalKind },
    Failed { id: GoalId, kind: GoalKind, reason: GoalFailure },
}

/// Per-creature goal stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalStack {
    goals: Vec<Goal>,
    idle: GoalId,
    next_id: GoalId,
    next_seq: u64,
    #[serde(skip)]
    events: Vec<GoalEvent>,
}

impl Default for GoalStack {
    fn default() -> Self {
        Self::new()
    }
}

fn rank(a: &Goal, b: &Goal) -> Ordering {
    b.urgency
        .partial_cmp(&a.urgency)
        .unwrap_or(Ordering::Equal)
        .then(b.depth.cmp(&a.depth))
        .then(a.seq.cmp(&b.seq))
}

impl GoalStack {
    /// A stack holding only the permanent, active idle goal.
    pub fn new() -> Self {
        let idle = Goal {
            id: 0,
            kind: GoalKind::Idle,
            urgency: 0.0,
            state: GoalState::Active,
            parent: None,
            depth: 0,
            seq: 0,
        };
        Self {
            goals: vec![idle],
            idle: 0,
            next_id: 1,
            next_seq: 1,
            events: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn idle_id(&self) -> GoalId {
        self.idle
    }

    pub fn get(&self, id: GoalId) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    fn get_mut(&mut self, id: GoalId) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| g.id == id)
    }

    /// The running goal.
    pub fn active(&self) -> Option<&Goal> {
        self.goals.iter().find(|g| g.state == GoalState::Active)
    }

    pub fn active_id(&self) -> Option<GoalId> {
        self.active().map(|g| g.id)
    }

    /// Goals in scheduling order, for inspection.
    pub fn ranked(&self) -> Vec<&Goal> {
        let mut out: Vec<&Goal> = self.goals.iter().collect();
        out.sort_by(|a, b| rank(a, b));
        out
    }

    pub fn contains_kind(&self, kind: &GoalKind) -> bool {
        self.goals.iter().any(|g| g.kind.same_behaviour(kind))
    }

    pub fn drain_events(&mut self) -> Vec<GoalEvent> {
        std::mem::take(&mut self.events)
    }

    /// Enqueue a root goal. An existing root goal with the same behaviour is
    /// reused and its urgency raised to the larger of the two.
    pub fn push(&mut self, kind: GoalKind, urgency: f32) -> GoalId {
        if kind == GoalKind::Idle {
            return self.idle;
        }
        let urgency = urgency.max(0.0);

        let existing = self
            .goals
            .iter()
            .find(|g| g.parent.is_none() && g.kind.same_behaviour(&kind))
            .map(|g| (g.id, g.urgency));
        if let Some((id, current)) = existing {
            if urgency > current {
                self.raise_urgency(id, urgency);
                self.reschedule();
            }
            return id;
        }

        let id = self.insert(kind, urgency, None, 0);
        self.reschedule();
        id
    }

    /// Hand a subtask to `kind` on behalf of `parent`. The parent waits until
    /// the subtask finishes. Returns `None` if `parent` is unknown or idle.
    pub fn delegate(&mut self, parent: GoalId, kind: GoalKind) -> Option<GoalId> {
        if parent == self.idle {
            return None;
        }
        let (urgency, depth) = {
            let p = self.get(parent)?;
            (p.urgency, p.depth + 1)
        };

        let child = self.insert(kind, urgency, Some(parent), depth);
        if let Some(p) = self.get_mut(parent) {
            p.state = GoalState::Waiting;
        }
        self.events.push(GoalEvent::Delegated { parent, child });
        self.reschedule();
        Some(child)
    }

    /// Finish a goal successfully. Its subtasks are dropped and its parent, if
    /// any, becomes runnable again.
    pub fn complete(&mut self, id: GoalId) -> bool {
        if id == self.idle {
            return false;
        }
        let Some(goal) = self.get(id).copied() else {
            return false;
        };

        self.remove_subtree(id);
        self.events.push(GoalEvent::Completed { id, kind: goal.kind });

        if let Some(parent_id) = goal.parent {
            let has_children = self.goals.iter().any(|g| g.parent == Some(parent_id));
            if let Some(parent) = self.get_mut(parent_id) {
                if !has_children && parent.state == GoalState::Waiting {
                    parent.state = GoalState::Pending;
                }
            }
        }

        self.reschedule();
        true
    }

    /// Give up on a goal. Failure travels up the delegation chain.
    pub fn fail(&mut self, id: GoalId, reason: GoalFailure) -> bool {
        if id == self.idle || self.get(id).is_none() {
            return false;
        }

        let mut current = Some((id, reason));
        while let Some((goal_id, why)) = current.take() {
            if goal_id == self.idle {
                break;
            }
            let Some(goal) = self.get(goal_id).copied() else {
                break;
            };
            self.remove_subtree(goal_id);
            self.events.push(GoalEvent::Failed {
                id: goal_id,
                kind: goal.kind,
                reason: why,
            });
            current = goal.parent.map(|p| (p, GoalFailure::SubtaskFailed));
        }

        self.reschedule();
        true
    }

    /// Change a goal's urgency. Its subtasks take the same value, up or down.
    pub fn set_urgency(&mut self, id: GoalId, urgency: f32) -> bool {
        if id == self.idle || self.get(id).is_none() {
            return false;
        }
        let urgency = urgency.max(0.0);
        let members = self.subtree(id);
        for goal in self.goals.iter_mut().filter(|g| members.contains(&g.id)) {
            goal.urgency = urgency;
        }
        self.reschedule();
        true
    }

    /// Swap per-run details of a goal (e.g. a stroll's chosen destination).
    /// The behaviour itself cannot change.
    pub fn update_kind(&mut self, id: GoalId, kind: GoalKind) -> bool {
        match self.get_mut(id) {
            Some(goal) if goal.kind.same_behaviour(&kind) => {
                goal.kind = kind;
                true
            }
            _ => false,
        }
    }

    fn insert(&mut self, kind: GoalKind, urgency: f32, parent: Option<GoalId>, depth: u32) -> GoalId {
        let id = self.next_id;
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.goals.push(Goal {
            id,
            kind,
            urgency,
            state: GoalState::Pending,
            parent,
            depth,
            seq,
        });
        id
    }

    /// Raise `id` and every descendant to at least `urgency`.
    fn raise_urgency(&mut self, id: GoalId, urgency: f32) {
        let members = self.subtree(id);
        for goal in self.goals.iter_mut().filter(|g| members.contains(&g.id)) {
            goal.urgency = goal.urgency.max(urgency);
        }
    }

    /// `id` followed by all of its descendants.
    fn subtree(&self, id: GoalId) -> Vec<GoalId> {
        let mut members = vec![id];
        let mut i = 0;
        while i < members.len() {
            let current = members[i];
            members.extend(
                self.goals
                    .iter()
                    .filter(|g| g.parent == Some(current))
                    .map(|g| g.id),
            );
            i += 1;
        }
        members
    }

    fn remove_subtree(&mut self, id: GoalId) {
        let doomed = self.subtree(id);
        self.goals.retain(|g| !doomed.contains(&g.id));
    }

    /// Re-evaluate which goal runs.
    fn reschedule(&mut self) {
        let Some(candidate) = self
            .goals
            .iter()
            .filter(|g| g.state != GoalState::Waiting)
            .min_by(|a, b| rank(a, b))
            .copied()
        else {
            return;
        };

        let active = self.active().copied();
        match active {
            Some(current) if current.id == candidate.id => {}
            Some(current) => {
                if candidate.urgency > current.urgency
                    && current.kind.interruptible_by(candidate.urgency)
                {
                    if let Some(g) = self.get_mut(current.id) {
                        g.state = GoalState::Suspended;
                    }
                    self.events.push(GoalEvent::Interrupted {
                        id: current.id,
                        by: candidate.id,
                    });
                    self.activate(candidate.id);
                }
            }
            None => self.activate(candidate.id),
        }
    }

    fn activate(&mut self, id: GoalId) {
        let Some(goal) = self.get_mut(id) else {
            return;
        };
        let resumed = goal.state == GoalState::Suspended;
        goal.state = GoalState::Active;
        let kind = goal.kind;
        self.events.push(if resumed {
            GoalEvent::Resumed { id, kind }
        } else {
            GoalEvent::Started { id, kind }
        });
    }
}

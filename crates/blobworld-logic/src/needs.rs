//! Needs: continuously accumulating deficits that spawn corrective goals.

use serde::{Deserialize, Serialize};

use crate::goals::GoalKind;
use crate::surface::Resource;

/// Types of needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedKind {
    Hunger,
    Thirst,
    Breath,
}

impl NeedKind {
    pub const ALL: [NeedKind; 3] = [NeedKind::Hunger, NeedKind::Thirst, NeedKind::Breath];

    /// Urgency multiplier applied to the deficit when enqueuing a goal.
    pub fn weight(self) -> f32 {
        match self {
            NeedKind::Hunger => 1.0,
            NeedKind::Thirst => 1.2,
            NeedKind::Breath => 1.5,
        }
    }

    /// Goal that fixes this need.
    pub fn corrective_goal(self) -> GoalKind {
        match self {
            NeedKind::Hunger => GoalKind::Eat,
            NeedKind::Thirst => GoalKind::Drink,
            NeedKind::Breath => GoalKind::LocateResource {
                resource: Resource::Air,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NeedKind::Hunger => "hunger",
            NeedKind::Thirst => "thirst",
            NeedKind::Breath => "breath",
        }
    }
}

/// Per-second accumulation rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedRates {
    pub hunger: f32,
    pub thirst: f32,
    /// Growth while the current tile has no air
    pub breath: f32,
    /// Recovery while the current tile has air
    pub breath_recovery: f32,
}

impl Default for NeedRates {
    fn default() -> Self {
        Self {
            hunger: 1.0 / 600.0,    // starving after 10 minutes
            thirst: 1.0 / 400.0,    // parched after ~7 minutes
            breath: 1.0 / 20.0,     // out of breath after 20 seconds
            breath_recovery: 0.25,
        }
    }
}

/// Deficits, all values 0.0 (satisfied) to 1.0 (desperate).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    pub hunger: f32,
    pub thirst: f32,
    pub breath: f32,
}

impl Needs {
    pub fn get(&self, kind: NeedKind) -> f32 {
        match kind {
            NeedKind::Hunger => self.hunger,
            NeedKind::Thirst => self.thirst,
            NeedKind::Breath => self.breath,
        }
    }

    fn get_mut(&mut self, kind: NeedKind) -> &mut f32 {
        match kind {
            NeedKind::Hunger => &mut self.hunger,
            NeedKind::Thirst => &mut self.thirst,
            NeedKind::Breath => &mut self.breath,
        }
    }

    /// Grow deficits over `dt` seconds. Breath recovers where there is air.
    pub fn accumulate(&mut self, dt: f32, rates: &NeedRates, has_air: bool) {
        self.hunger = (self.hunger + rates.hunger * dt).clamp(0.0, 1.0);
        self.thirst = (self.thirst + rates.thirst * dt).clamp(0.0, 1.0);
        self.breath = if has_air {
            (self.breath - rates.breath_recovery * dt).clamp(0.0, 1.0)
        } else {
            (self.breath + rates.breath * dt).clamp(0.0, 1.0)
        };
    }

    /// Reduce a deficit.
    pub fn satisfy(&mut self, kind: NeedKind, amount: f32) {
        let value = self.get_mut(kind);
        *value = (*value - amount).clamp(0.0, 1.0);
    }

    /// Needs above `threshold` with their weighted urgency, most urgent first.
    pub fn critical(&self, threshold: f32) -> Vec<(NeedKind, f32)> {
        let mut out: Vec<(NeedKind, f32)> = NeedKind::ALL
            .iter()
            .filter(|k| self.get(**k) > threshold)
            .map(|k| (*k, self.get(*k) * k.weight()))
            .collect();
        out.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        out
    }

    /// The most urgent need above the threshold.
    pub fn most_urgent(&self, threshold: f32) -> Option<NeedKind> {
        self.critical(threshold).first().map(|(k, _)| *k)
    }

    /// Number of needs fully maxed out.
    pub fn maxed_count(&self) -> usize {
        NeedKind::ALL.iter().filter(|k| self.get(**k) >= 1.0).count()
    }

    /// Any need at its limit; drains health.
    pub fn starving(&self) -> bool {
        self.maxed_count() > 0
    }
}

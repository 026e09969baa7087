#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use lane_defence_core::{
    MonsterId, MonsterView, Position, TargetingPolicy, TowerTarget, TowerView,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    monster_workspace: Vec<MonsterCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Every tower is matched against the monsters inside `engagement_radius`.
    /// [`TargetingPolicy::FirstMatch`] keeps the earliest spawned candidate,
    /// [`TargetingPolicy::Nearest`] the closest one with spawn order breaking
    /// ties. The output buffer is cleared before populating it with the latest
    /// assignments.
    pub fn handle(
        &mut self,
        policy: TargetingPolicy,
        engagement_radius: f32,
        towers: &TowerView,
        monsters: &MonsterView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.iter().next().is_none() || monsters.is_empty() {
            return;
        }

        self.prepare_monster_workspace(monsters);
        if self.monster_workspace.is_empty() {
            return;
        }

        for tower in towers.iter() {
            let origin = tower.cell.position();
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.monster_workspace {
                let distance = origin.distance(candidate.position);
                if distance > engagement_radius {
                    continue;
                }

                let current = BestCandidate {
                    distance,
                    monster: candidate.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing, policy) {
                            *existing = current;
                        }
                    }
                    None => {
                        best = Some(current);
                        if policy == TargetingPolicy::FirstMatch {
                            break;
                        }
                    }
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    monster: best_candidate.monster,
                    distance: best_candidate.distance,
                });
            }
        }
    }

    fn prepare_monster_workspace(&mut self, monsters: &MonsterView) {
        self.monster_workspace.clear();
        self.monster_workspace.reserve(monsters.len());

        for snapshot in monsters.iter() {
            if snapshot.defeated {
                continue;
            }

            self.monster_workspace.push(MonsterCandidate {
                id: snapshot.id,
                position: snapshot.position,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct MonsterCandidate {
    id: MonsterId,
    position: Position,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance: f32,
    monster: MonsterId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self, policy: TargetingPolicy) -> bool {
        if policy == TargetingPolicy::Nearest && self.distance != other.distance {
            return self.distance < other.distance;
        }

        self.monster < other.monster
    }
}

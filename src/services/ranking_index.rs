use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{StandingRow, TeamId, TeamRecord};

/// Detached copy of the fields a team is ranked by.
///
/// The index keys on these copies, never on the live record, so a record may
/// change freely as long as its key is removed before and reinserted after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub solved_count: u32,
    pub penalty: i64,
    /// Ascending.
    pub solved_times: Vec<i64>,
    pub name: String,
}

impl Standing {
    pub fn of(team: &TeamRecord) -> Self {
        Self {
            solved_count: team.solved_count,
            penalty: team.penalty,
            solved_times: team.solved_times.clone(),
            name: team.name().to_string(),
        }
    }
}

impl Ord for Standing {
    /// `Less` means ranked better.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .solved_count
            .cmp(&self.solved_count)
            .then_with(|| self.penalty.cmp(&other.penalty))
            // Latest solve first: whoever solved their last problem earlier wins.
            .then_with(|| {
                self.solved_times
                    .iter()
                    .rev()
                    .cmp(other.solved_times.iter().rev())
            })
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Standing {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct RankingIndex {
    order: BTreeMap<Standing, TeamId>,
    /// Key each team is currently indexed under, by `TeamId`.
    keys: Vec<Option<Standing>>,
}

impl RankingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `team` under its current standing, replacing any stale entry.
    pub fn insert(&mut self, id: TeamId, team: &TeamRecord) {
        self.remove(id);
        if self.keys.len() <= id.0 {
            self.keys.resize(id.0 + 1, None);
        }
        let key = Standing::of(team);
        self.order.insert(key.clone(), id);
        self.keys[id.0] = Some(key);
    }

    pub fn remove(&mut self, id: TeamId) -> Option<Standing> {
        let key = self.keys.get_mut(id.0)?.take()?;
        self.order.remove(&key);
        Some(key)
    }

    /// Rebuilds the index from every record and assigns ranks `1..=N`.
    pub fn flush(&mut self, teams: &mut [TeamRecord]) {
        self.order.clear();
        self.keys.clear();
        for (slot, team) in teams.iter().enumerate() {
            self.insert(TeamId(slot), team);
        }
        self.assign_ranks(teams);
        debug!("Ranking index rebuilt with {} teams", self.order.len());
    }

    /// Writes index positions into the records without rebuilding.
    pub fn assign_ranks(&self, teams: &mut [TeamRecord]) {
        for (position, id) in self.order.values().enumerate() {
            if let Some(team) = teams.get_mut(id.0) {
                team.rank = position + 1;
            }
        }
    }

    /// First indexed team that does not rank strictly better than `standing`.
    pub fn first_not_better_than(&self, standing: &Standing) -> Option<TeamId> {
        self.order.range::<Standing, _>(standing..).next().map(|(_, id)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.order.values().copied()
    }

    pub fn standings(&self, teams: &[TeamRecord]) -> Vec<StandingRow> {
        self.iter()
            .filter_map(|id| teams.get(id.0))
            .map(TeamRecord::standing_row)
            .collect()
    }
}

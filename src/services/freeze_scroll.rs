use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ContestError;
use crate::models::{ProblemState, StandingRow, TeamRecord};
use crate::services::ranking_index::{RankingIndex, Standing};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum BoardState {
    #[default]
    Unfrozen,
    Frozen,
}

/// A revealed problem lifted `team` above `displaced`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overtake {
    pub team: String,
    pub displaced: String,
    pub solved_count: u32,
    pub penalty: i64,
}

impl fmt::Display for Overtake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.team, self.displaced, self.solved_count, self.penalty
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollReport {
    /// Flushed standings before the first reveal.
    pub before: Vec<StandingRow>,
    pub overtakes: Vec<Overtake>,
    /// Flushed standings after every frozen problem is revealed.
    pub after: Vec<StandingRow>,
}

pub fn freeze(teams: &mut [TeamRecord], board: &mut BoardState) -> Result<(), ContestError> {
    if *board == BoardState::Frozen {
        return Err(ContestError::ScoreboardAlreadyFrozen);
    }

    for record in teams.iter_mut().flat_map(|team| team.problems.iter_mut()) {
        record.before_freeze_error_count = record.error_count;
    }
    *board = BoardState::Frozen;
    info!("Scoreboard frozen for {} teams", teams.len());
    Ok(())
}

/// Unfreezes the board, revealing frozen problems one at a time: always the
/// worst-ranked pending team, always its lowest-indexed frozen problem.
pub fn scroll(
    teams: &mut [TeamRecord],
    index: &mut RankingIndex,
    board: &mut BoardState,
    penalty_per_error: i64,
) -> Result<ScrollReport, ContestError> {
    if *board != BoardState::Frozen {
        return Err(ContestError::ScoreboardNotFrozen);
    }
    *board = BoardState::Unfrozen;

    index.flush(teams);
    let before = index.standings(teams);

    let mut pending: BTreeMap<Standing, _> = index
        .iter()
        .filter(|id| teams.get(id.0).is_some_and(|team| team.has_frozen_problem))
        .map(|id| (Standing::of(&teams[id.0]), id))
        .collect();
    let mut overtakes = Vec::new();
    let mut reveals = 0usize;

    while let Some((_, id)) = pending.pop_last() {
        let mut revealed = teams[id.0].clone();
        if !reveal_next(&mut revealed, penalty_per_error) {
            teams[id.0].has_frozen_problem = false;
            continue;
        }
        reveals += 1;

        let updated = Standing::of(&revealed);
        if let Some(displaced) = index.first_not_better_than(&updated)
            && displaced != id
        {
            let overtake = Overtake {
                team: revealed.name().to_string(),
                displaced: teams[displaced.0].name().to_string(),
                solved_count: revealed.solved_count,
                penalty: revealed.penalty,
            };
            debug!("Reveal moved {} above {}", overtake.team, overtake.displaced);
            overtakes.push(overtake);
        }

        index.remove(id);
        teams[id.0] = revealed;
        index.insert(id, &teams[id.0]);

        if teams[id.0].has_frozen_problem {
            pending.insert(updated, id);
        }
    }

    index.flush(teams);
    let after = index.standings(teams);
    info!(
        "Scroll finished: {} reveals, {} overtakes",
        reveals,
        overtakes.len()
    );

    Ok(ScrollReport {
        before,
        overtakes,
        after,
    })
}

/// Reveals the lowest-indexed frozen problem of a detached team copy.
fn reveal_next(team: &mut TeamRecord, penalty_per_error: i64) -> bool {
    let Some(problem) = team.first_frozen_problem() else {
        return false;
    };

    if !team.credit_solve(problem, penalty_per_error) {
        team.problems[problem].state = ProblemState::Open;
    }
    debug!(
        "Revealed problem {} of {}: {:?}",
        problem,
        team.name(),
        team.problems[problem].state
    );
    team.refresh_frozen_flag();
    true
}

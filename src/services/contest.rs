use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ContestError, StartedAction};
use crate::models::{ProblemRecord, StandingRow, TeamId, TeamRecord, problem_index};
use crate::services::freeze_scroll::{self, BoardState, ScrollReport};
use crate::services::ranking_index::RankingIndex;
use crate::services::submission_processor::{Submission, SubmissionProcessor};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Phase {
    #[default]
    Registration,
    Running {
        duration: i64,
        problem_count: usize,
    },
}

/// In-memory store of one contest. Owns every team record and the index over them.
#[derive(Debug, Default)]
pub struct Contest {
    teams: Vec<TeamRecord>,
    by_name: HashMap<String, TeamId>,
    index: RankingIndex,
    phase: Phase,
    board: BoardState,
    processor: SubmissionProcessor,
}

/// Serialisable view of the board, written out after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ContestSnapshot {
    pub phase: Phase,
    pub board: BoardState,
    pub standings: Vec<StandingRow>,
}

impl Contest {
    pub fn new(penalty_per_error: i64) -> Self {
        Self {
            processor: SubmissionProcessor::new(penalty_per_error),
            ..Self::default()
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn is_frozen(&self) -> bool {
        self.board == BoardState::Frozen
    }

    pub fn problem_count(&self) -> usize {
        match self.phase {
            Phase::Registration => 0,
            Phase::Running { problem_count, .. } => problem_count,
        }
    }

    pub fn team(&self, name: &str) -> Option<&TeamRecord> {
        self.by_name.get(name).and_then(|id| self.teams.get(id.0))
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn add_team(&mut self, name: &str) -> Result<(), ContestError> {
        if self.is_started() {
            return Err(ContestError::CompetitionAlreadyStarted {
                action: StartedAction::Add,
            });
        }

        match self.by_name.entry(name.to_string()) {
            Entry::Occupied(_) => Err(ContestError::DuplicateTeam),
            Entry::Vacant(entry) => {
                let id = TeamId(self.teams.len());
                entry.insert(id);
                self.teams.push(TeamRecord::new(name));
                self.index.insert(id, &self.teams[id.0]);
                debug!("Added team {} as {:?}", name, id);
                Ok(())
            }
        }
    }

    pub fn start(&mut self, duration: i64, problem_count: usize) -> Result<(), ContestError> {
        if self.is_started() {
            return Err(ContestError::CompetitionAlreadyStarted {
                action: StartedAction::Start,
            });
        }

        self.phase = Phase::Running {
            duration,
            problem_count,
        };
        for team in &mut self.teams {
            team.problems = vec![ProblemRecord::default(); problem_count];
        }
        self.index.assign_ranks(&mut self.teams);
        info!(
            "Contest started: {} teams, {} problems, duration {}",
            self.teams.len(),
            problem_count,
            duration
        );
        Ok(())
    }

    /// Applies a submission. Events that break a precondition are logged and dropped.
    pub fn submit(&mut self, submission: &Submission) -> bool {
        if !self.is_started() {
            warn!("Ignoring submission before contest start: {:?}", submission);
            return false;
        }
        let Some(&id) = self.by_name.get(&submission.team) else {
            warn!("Ignoring submission from unknown team {}", submission.team);
            return false;
        };
        let Some(problem) =
            problem_index(submission.problem).filter(|&index| index < self.problem_count())
        else {
            warn!(
                "Ignoring submission on unknown problem {} by {}",
                submission.problem, submission.team
            );
            return false;
        };

        let frozen = self.is_frozen();
        self.index.remove(id);
        self.processor.apply(
            &mut self.teams[id.0],
            problem,
            submission.verdict,
            submission.time,
            frozen,
        );
        self.index.insert(id, &self.teams[id.0]);
        true
    }

    pub fn flush(&mut self) {
        self.index.flush(&mut self.teams);
    }

    pub fn freeze(&mut self) -> Result<(), ContestError> {
        freeze_scroll::freeze(&mut self.teams, &mut self.board)
    }

    pub fn scroll(&mut self) -> Result<ScrollReport, ContestError> {
        freeze_scroll::scroll(
            &mut self.teams,
            &mut self.index,
            &mut self.board,
            self.processor.penalty_per_error(),
        )
    }

    /// Rows in index order with the ranks of the last flush.
    pub fn standings(&self) -> Vec<StandingRow> {
        self.index.standings(&self.teams)
    }

    pub fn snapshot(&mut self) -> ContestSnapshot {
        self.flush();
        ContestSnapshot {
            phase: self.phase,
            board: self.board,
            standings: self.standings(),
        }
    }
}

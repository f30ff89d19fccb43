use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Accepted")]
    Accepted,
    #[serde(rename = "Wrong_Answer")]
    WrongAnswer,
    #[serde(rename = "Runtime_Error")]
    RuntimeError,
    #[serde(rename = "Time_Limit_Exceed")]
    TimeLimitExceed,
}

impl Verdict {
    pub const ALL: [Verdict; 4] = [
        Verdict::Accepted,
        Verdict::WrongAnswer,
        Verdict::RuntimeError,
        Verdict::TimeLimitExceed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Accepted => "Accepted",
            Verdict::WrongAnswer => "Wrong_Answer",
            Verdict::RuntimeError => "Runtime_Error",
            Verdict::TimeLimitExceed => "Time_Limit_Exceed",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|verdict| verdict.as_str() == word)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zero-based problem index for a problem letter (`A` is 0).
pub fn problem_index(letter: char) -> Option<usize> {
    letter
        .is_ascii_uppercase()
        .then(|| usize::from(letter as u8 - b'A'))
}

pub fn problem_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|offset| b'A'.checked_add(offset))
        .map_or('?', char::from)
}

/// Arena handle of a team inside a contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamId(pub usize);

/// One slot per verdict kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerdictSlots<T> {
    pub accepted: T,
    pub wrong_answer: T,
    pub runtime_error: T,
    pub time_limit_exceed: T,
}

impl<T> VerdictSlots<T> {
    pub fn get(&self, verdict: Verdict) -> &T {
        match verdict {
            Verdict::Accepted => &self.accepted,
            Verdict::WrongAnswer => &self.wrong_answer,
            Verdict::RuntimeError => &self.runtime_error,
            Verdict::TimeLimitExceed => &self.time_limit_exceed,
        }
    }

    pub fn get_mut(&mut self, verdict: Verdict) -> &mut T {
        match verdict {
            Verdict::Accepted => &mut self.accepted,
            Verdict::WrongAnswer => &mut self.wrong_answer,
            Verdict::RuntimeError => &mut self.runtime_error,
            Verdict::TimeLimitExceed => &mut self.time_limit_exceed,
        }
    }
}

/// Most recent submission of a given verdict on any problem of a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastEvent {
    pub problem: usize,
    pub time: i64,
}

/// Most recent submission of any verdict on any problem of a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastSubmission {
    pub problem: usize,
    pub verdict: Verdict,
    pub time: i64,
}

/// Most recent submission of any verdict on a single problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastVerdict {
    pub verdict: Verdict,
    pub time: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ProblemState {
    #[default]
    Open,
    Solved,
    /// Submitted during the freeze window while unsolved; outcome hidden until scroll.
    Frozen,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemRecord {
    pub state: ProblemState,
    /// Rejected submissions before the first accept.
    pub error_count: u32,
    pub submit_count: u32,
    /// `error_count` as it was when the board was last frozen. Display only.
    pub before_freeze_error_count: u32,
    pub first_accept_time: Option<i64>,
    pub last_by_verdict: VerdictSlots<Option<i64>>,
    pub last_submission: Option<LastVerdict>,
}

impl fmt::Display for ProblemRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            ProblemState::Open if self.error_count == 0 => f.write_str("."),
            ProblemState::Open => write!(f, "-{}", self.error_count),
            ProblemState::Solved if self.error_count == 0 => f.write_str("+"),
            ProblemState::Solved => write!(f, "+{}", self.error_count),
            ProblemState::Frozen => {
                let before = self.before_freeze_error_count;
                let after = i64::from(self.submit_count) - i64::from(before);
                if before == 0 {
                    write!(f, "0/{after}")
                } else {
                    write!(f, "-{before}/{after}")
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRecord {
    name: String,
    /// Valid only after a flush or scroll.
    pub rank: usize,
    pub solved_count: u32,
    pub penalty: i64,
    pub has_frozen_problem: bool,
    /// First-accept times of solved problems, ascending.
    pub solved_times: Vec<i64>,
    pub problems: Vec<ProblemRecord>,
    pub last_submission: Option<LastSubmission>,
    pub last_by_verdict: VerdictSlots<Option<LastEvent>>,
}

impl TeamRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rank: 0,
            solved_count: 0,
            penalty: 0,
            has_frozen_problem: false,
            solved_times: Vec::new(),
            problems: Vec::new(),
            last_submission: None,
            last_by_verdict: VerdictSlots::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_solved_time(&mut self, time: i64) {
        let at = self.solved_times.partition_point(|&solved| solved <= time);
        self.solved_times.insert(at, time);
    }

    /// Moves a problem with a recorded accept to Solved and charges its penalty.
    ///
    /// Returns `false` (and changes nothing) when the problem has no accept yet.
    pub fn credit_solve(&mut self, problem: usize, penalty_per_error: i64) -> bool {
        let Some(record) = self.problems.get_mut(problem) else {
            return false;
        };
        let Some(accepted_at) = record.first_accept_time else {
            return false;
        };

        record.state = ProblemState::Solved;
        let charge = i64::from(record.error_count)
            .saturating_mul(penalty_per_error)
            .saturating_add(accepted_at);
        self.penalty = self.penalty.saturating_add(charge);
        self.add_solved_time(accepted_at);
        self.solved_count += 1;
        true
    }

    pub fn first_frozen_problem(&self) -> Option<usize> {
        self.problems
            .iter()
            .position(|record| record.state == ProblemState::Frozen)
    }

    pub fn refresh_frozen_flag(&mut self) {
        self.has_frozen_problem = self.first_frozen_problem().is_some();
    }

    pub fn standing_row(&self) -> StandingRow {
        StandingRow {
            name: self.name.clone(),
            rank: self.rank,
            solved_count: self.solved_count,
            penalty: self.penalty,
            cells: self.problems.iter().map(ToString::to_string).collect(),
        }
    }
}

/// One printed scoreboard line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    pub name: String,
    pub rank: usize,
    pub solved_count: u32,
    pub penalty: i64,
    pub cells: Vec<String>,
}

impl fmt::Display for StandingRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} ",
            self.name, self.rank, self.solved_count, self.penalty
        )?;
        for cell in &self.cells {
            write!(f, "{cell} ")?;
        }
        Ok(())
    }
}

use std::fmt;

use crate::error::{ContestError, QueryKind};
use crate::models::{Verdict, problem_index, problem_letter};
use crate::services::contest::Contest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemFilter {
    Any,
    Problem(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    Any,
    Verdict(Verdict),
    /// A status word outside the verdict vocabulary; never matches.
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingAnswer {
    pub team: String,
    pub rank: usize,
    /// Rank was computed before a freeze and may be stale.
    pub frozen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionHit {
    pub team: String,
    pub problem: usize,
    pub verdict: Verdict,
    pub time: i64,
}

impl fmt::Display for SubmissionHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.team,
            problem_letter(self.problem),
            self.verdict,
            self.time
        )
    }
}

pub fn query_ranking(contest: &Contest, team: &str) -> Result<RankingAnswer, ContestError> {
    let record = contest.team(team).ok_or(ContestError::TeamNotFound {
        query: QueryKind::Ranking,
    })?;
    Ok(RankingAnswer {
        team: record.name().to_string(),
        rank: record.rank,
        frozen: contest.is_frozen(),
    })
}

/// Latest submission of `team` matching both filters, read from the per-verdict indices.
pub fn query_submission(
    contest: &Contest,
    team: &str,
    problem: ProblemFilter,
    status: &StatusFilter,
) -> Result<Option<SubmissionHit>, ContestError> {
    let record = contest.team(team).ok_or(ContestError::TeamNotFound {
        query: QueryKind::Submission,
    })?;
    let hit = |problem: usize, verdict: Verdict, time: i64| SubmissionHit {
        team: record.name().to_string(),
        problem,
        verdict,
        time,
    };

    let found = match (problem, status) {
        (_, StatusFilter::Unrecognized(_)) => None,
        (ProblemFilter::Any, StatusFilter::Any) => record
            .last_submission
            .map(|last| hit(last.problem, last.verdict, last.time)),
        (ProblemFilter::Any, StatusFilter::Verdict(verdict)) => record
            .last_by_verdict
            .get(*verdict)
            .as_ref()
            .map(|last| hit(last.problem, *verdict, last.time)),
        (ProblemFilter::Problem(letter), status) => {
            let Some((index, cell)) = problem_index(letter)
                .and_then(|index| record.problems.get(index).map(|cell| (index, cell)))
            else {
                return Ok(None);
            };
            match status {
                StatusFilter::Verdict(verdict) => cell
                    .last_by_verdict
                    .get(*verdict)
                    .as_ref()
                    .map(|time| hit(index, *verdict, *time)),
                _ => cell
                    .last_submission
                    .map(|last| hit(index, last.verdict, last.time)),
            }
        }
    };
    Ok(found)
}

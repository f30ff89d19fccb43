use tracing::warn;

use crate::models::{LastEvent, LastSubmission, LastVerdict, ProblemState, TeamRecord, Verdict};

pub const DEFAULT_PENALTY_PER_ERROR: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub team: String,
    pub problem: char,
    pub verdict: Verdict,
    pub time: i64,
}

/// Applies single judged submissions to a team.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionProcessor {
    penalty_per_error: i64,
}

impl Default for SubmissionProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_PENALTY_PER_ERROR)
    }
}

impl SubmissionProcessor {
    pub fn new(penalty_per_error: i64) -> Self {
        Self { penalty_per_error }
    }

    pub fn penalty_per_error(&self) -> i64 {
        self.penalty_per_error
    }

    /// Records one submission on `problem`. While `board_frozen`, any outcome on an
    /// unsolved problem is hidden behind the Frozen state and scored at scroll time.
    pub fn apply(
        &self,
        team: &mut TeamRecord,
        problem: usize,
        verdict: Verdict,
        time: i64,
        board_frozen: bool,
    ) {
        let Some(record) = team.problems.get_mut(problem) else {
            warn!(
                "Problem index {} out of range for team {}",
                problem,
                team.name()
            );
            return;
        };

        record.submit_count += 1;
        record.last_submission = Some(LastVerdict { verdict, time });
        *record.last_by_verdict.get_mut(verdict) = Some(time);

        let already_solved = record.state == ProblemState::Solved;
        let mut credit = false;
        let mut freeze = false;

        if verdict == Verdict::Accepted {
            if !already_solved {
                record.first_accept_time.get_or_insert(time);
                if board_frozen {
                    freeze = true;
                } else {
                    credit = true;
                }
            }
        } else if !already_solved {
            // Errors only count until the first accept, even one still hidden by a freeze.
            if record.first_accept_time.is_none() {
                record.error_count += 1;
            }
            freeze = board_frozen;
        }

        if freeze {
            record.state = ProblemState::Frozen;
        }

        team.last_submission = Some(LastSubmission {
            problem,
            verdict,
            time,
        });
        *team.last_by_verdict.get_mut(verdict) = Some(LastEvent { problem, time });

        if freeze {
            team.has_frozen_problem = true;
        }
        if credit {
            team.credit_solve(problem, self.penalty_per_error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProblemRecord;

    fn team_with(problem_count: usize) -> TeamRecord {
        let mut team = TeamRecord::new("team");
        team.problems = vec![ProblemRecord::default(); problem_count];
        team
    }

    #[test]
    fn wrong_attempts_before_accept_add_twenty_each() {
        let processor = SubmissionProcessor::default();
        let mut team = team_with(1);
        processor.apply(&mut team, 0, Verdict::WrongAnswer, 10, false);
        processor.apply(&mut team, 0, Verdict::RuntimeError, 12, false);
        processor.apply(&mut team, 0, Verdict::Accepted, 15, false);

        assert_eq!(team.solved_count, 1);
        assert_eq!(team.penalty, 15 + 2 * 20);
        assert_eq!(team.solved_times, vec![15]);
        assert_eq!(team.problems[0].to_string(), "+2");
    }

    #[test]
    fn submissions_after_solve_do_not_change_score() {
        let processor = SubmissionProcessor::default();
        let mut team = team_with(1);
        processor.apply(&mut team, 0, Verdict::Accepted, 30, false);
        processor.apply(&mut team, 0, Verdict::WrongAnswer, 40, false);
        processor.apply(&mut team, 0, Verdict::Accepted, 50, false);

        let record = &team.problems[0];
        assert_eq!(record.error_count, 0);
        assert_eq!(record.submit_count, 3);
        assert_eq!(record.first_accept_time, Some(30));
        assert_eq!(record.last_by_verdict.accepted, Some(50));
        assert_eq!(team.penalty, 30);
        assert_eq!(team.solved_count, 1);
    }

    #[test]
    fn frozen_accept_defers_scoring() {
        let processor = SubmissionProcessor::default();
        let mut team = team_with(2);
        processor.apply(&mut team, 1, Verdict::Accepted, 20, true);

        assert_eq!(team.problems[1].state, ProblemState::Frozen);
        assert_eq!(team.problems[1].first_accept_time, Some(20));
        assert!(team.has_frozen_problem);
        assert_eq!(team.solved_count, 0);
        assert_eq!(team.penalty, 0);
        assert!(team.solved_times.is_empty());
    }

    #[test]
    fn frozen_rejection_freezes_open_problem() {
        let processor = SubmissionProcessor::default();
        let mut team = team_with(1);
        processor.apply(&mut team, 0, Verdict::TimeLimitExceed, 5, true);

        let record = &team.problems[0];
        assert_eq!(record.state, ProblemState::Frozen);
        assert_eq!(record.error_count, 1);
        assert_eq!(record.first_accept_time, None);
        assert!(team.has_frozen_problem);
    }

    #[test]
    fn solved_problem_stays_visible_during_freeze() {
        let processor = SubmissionProcessor::default();
        let mut team = team_with(1);
        processor.apply(&mut team, 0, Verdict::Accepted, 5, false);
        processor.apply(&mut team, 0, Verdict::WrongAnswer, 8, true);

        assert_eq!(team.problems[0].state, ProblemState::Solved);
        assert!(!team.has_frozen_problem);
    }

    #[test]
    fn last_event_indices_track_every_verdict() {
        let processor = SubmissionProcessor::default();
        let mut team = team_with(3);
        processor.apply(&mut team, 2, Verdict::WrongAnswer, 1, false);
        processor.apply(&mut team, 0, Verdict::RuntimeError, 2, false);
        processor.apply(&mut team, 1, Verdict::WrongAnswer, 3, false);

        assert_eq!(
            team.last_submission,
            Some(LastSubmission {
                problem: 1,
                verdict: Verdict::WrongAnswer,
                time: 3
            })
        );
        assert_eq!(
            team.last_by_verdict.wrong_answer,
            Some(LastEvent {
                problem: 1,
                time: 3
            })
        );
        assert_eq!(
            team.last_by_verdict.runtime_error,
            Some(LastEvent {
                problem: 0,
                time: 2
            })
        );
        assert_eq!(team.last_by_verdict.accepted, None);
    }

    #[test]
    fn out_of_range_problem_is_ignored() {
        let processor = SubmissionProcessor::default();
        let mut team = team_with(1);
        processor.apply(&mut team, 4, Verdict::Accepted, 1, false);
        assert_eq!(team.last_submission, None);
        assert_eq!(team.solved_count, 0);
    }
}

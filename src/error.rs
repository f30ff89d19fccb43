use std::fmt;

use thiserror::Error;

/// Command rejected because the contest has already started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartedAction {
    Add,
    Start,
}

impl fmt::Display for StartedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StartedAction::Add => "Add",
            StartedAction::Start => "Start",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Ranking,
    Submission,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryKind::Ranking => "ranking",
            QueryKind::Submission => "submission",
        })
    }
}

/// Recoverable rejections. `Display` is the line printed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContestError {
    #[error("[Error]Add failed: duplicated team name.")]
    DuplicateTeam,
    #[error("[Error]{action} failed: competition has started.")]
    CompetitionAlreadyStarted { action: StartedAction },
    #[error("[Error]Query {query} failed: cannot find the team.")]
    TeamNotFound { query: QueryKind },
    #[error("[Error]Freeze failed: scoreboard has been frozen.")]
    ScoreboardAlreadyFrozen,
    #[error("[Error]Scroll failed: scoreboard has not been frozen.")]
    ScoreboardNotFrozen,
}

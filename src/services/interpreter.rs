use std::borrow::Cow;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::services::command_lexer::{Command, parse_command};
use crate::services::config_loader::ScoreboardConfig;
use crate::services::contest::Contest;
use crate::services::query_engine::{self, RankingAnswer};

const FROZEN_RANKING_WARNING: &str =
    "[Warning]Scoreboard is frozen. The ranking may be inaccurate until it were scrolled.";
const NO_SUBMISSION: &str = "Cannot find any submission.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Ended,
}

/// Replays every line of `input`, writing protocol output to `out`.
pub fn run<R: BufRead, W: Write>(
    mut input: R,
    mut out: W,
    config: &ScoreboardConfig,
) -> Result<Contest> {
    let mut contest = Contest::new(config.penalty_per_error);
    let mut commands = 0u64;

    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        line_no += 1;
        let read = input
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("Failed to read input line {line_no}"))?;
        if read == 0 {
            break;
        }
        let line = decode_line(&buf);
        if let Cow::Owned(_) = line {
            warn!("Line {} is not valid UTF-8, replaced invalid bytes", line_no);
        }
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                warn!("Skipping line {}: {}", line_no, err);
                continue;
            }
        };

        commands += 1;
        let flow = execute(&mut contest, command, &mut out)
            .with_context(|| format!("Failed to write output for line {line_no}"))?;
        if flow == Flow::Ended && config.stop_at_end {
            break;
        }
    }

    out.flush().context("Failed to flush output")?;
    info!("Replay finished after {} commands", commands);
    Ok(contest)
}

/// Strips the line terminator; invalid UTF-8 is replaced, not rejected.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

pub fn execute<W: Write>(contest: &mut Contest, command: Command, out: &mut W) -> Result<Flow> {
    debug!("Executing {:?}", command);
    match command {
        Command::AddTeam { name } => match contest.add_team(&name) {
            Ok(()) => writeln!(out, "[Info]Add successfully.")?,
            Err(err) => writeln!(out, "{err}")?,
        },
        Command::Start {
            duration,
            problem_count,
        } => match contest.start(duration, problem_count) {
            Ok(()) => writeln!(out, "[Info]Competition starts.")?,
            Err(err) => writeln!(out, "{err}")?,
        },
        Command::Submit(submission) => {
            contest.submit(&submission);
        }
        Command::Flush => {
            contest.flush();
            writeln!(out, "[Info]Flush scoreboard.")?;
        }
        Command::Freeze => match contest.freeze() {
            Ok(()) => writeln!(out, "[Info]Freeze scoreboard.")?,
            Err(err) => writeln!(out, "{err}")?,
        },
        Command::Scroll => match contest.scroll() {
            Ok(report) => {
                writeln!(out, "[Info]Scroll scoreboard.")?;
                for row in &report.before {
                    writeln!(out, "{row}")?;
                }
                for overtake in &report.overtakes {
                    writeln!(out, "{overtake}")?;
                }
                for row in &report.after {
                    writeln!(out, "{row}")?;
                }
            }
            Err(err) => writeln!(out, "{err}")?,
        },
        Command::QueryRanking { team } => match query_engine::query_ranking(contest, &team) {
            Ok(RankingAnswer { team, rank, frozen }) => {
                writeln!(out, "[Info]Complete query ranking.")?;
                if frozen {
                    writeln!(out, "{FROZEN_RANKING_WARNING}")?;
                }
                writeln!(out, "{team} NOW AT RANKING {rank}")?;
            }
            Err(err) => writeln!(out, "{err}")?,
        },
        Command::QuerySubmission {
            team,
            problem,
            status,
        } => match query_engine::query_submission(contest, &team, problem, &status) {
            Ok(hit) => {
                writeln!(out, "[Info]Complete query submission.")?;
                match hit {
                    Some(hit) => writeln!(out, "{hit}")?,
                    None => writeln!(out, "{NO_SUBMISSION}")?,
                }
            }
            Err(err) => writeln!(out, "{err}")?,
        },
        Command::End => {
            writeln!(out, "[Info]Competition ends.")?;
            return Ok(Flow::Ended);
        }
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(input: &str, config: &ScoreboardConfig) -> String {
        let mut out = Vec::new();
        run(input.as_bytes(), &mut out, config).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn malformed_lines_produce_no_output() {
        let output = replay(
            "ADDTEAM a\nBOGUS line\n\nSTART DURATION x PROBLEM 1\nEND\n",
            &ScoreboardConfig::default(),
        );
        assert_eq!(output, "[Info]Add successfully.\n[Info]Competition ends.\n");
    }

    #[test]
    fn end_keeps_reading_unless_configured_to_stop() {
        let input = "END\nADDTEAM late\n";
        assert_eq!(
            replay(input, &ScoreboardConfig::default()),
            "[Info]Competition ends.\n[Info]Add successfully.\n"
        );

        let config = ScoreboardConfig {
            stop_at_end: true,
            ..ScoreboardConfig::default()
        };
        assert_eq!(replay(input, &config), "[Info]Competition ends.\n");
    }

    #[test]
    fn invalid_utf8_line_does_not_end_the_replay() {
        let mut out = Vec::new();
        let contest = run(
            &b"ADDTEAM \xff\nADDTEAM b\r\nQUERY_RANKING b\n"[..],
            &mut out,
            &ScoreboardConfig::default(),
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[Info]Add successfully.\n[Info]Add successfully.\n\
             [Info]Complete query ranking.\nb NOW AT RANKING 0\n"
        );
        assert_eq!(contest.team_count(), 2);
        assert!(contest.team("\u{fffd}").is_some());
    }

    #[test]
    fn returns_final_contest_state() {
        let mut out = Vec::new();
        let contest = run(
            "ADDTEAM a\nSTART DURATION 10 PROBLEM 2\nSUBMIT B BY a WITH Accepted AT 4\n".as_bytes(),
            &mut out,
            &ScoreboardConfig::default(),
        )
        .unwrap();
        assert_eq!(contest.team("a").map(|team| team.solved_count), Some(1));
        assert!(contest.is_started());
    }
}

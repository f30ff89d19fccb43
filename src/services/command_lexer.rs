use std::collections::HashMap;
use std::str::SplitWhitespace;
use std::sync::LazyLock;

use thiserror::Error;

use crate::models::Verdict;
use crate::services::query_engine::{ProblemFilter, StatusFilter};
use crate::services::submission_processor::Submission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    AddTeam,
    Start,
    Submit,
    Flush,
    Freeze,
    Scroll,
    QueryRanking,
    QuerySubmission,
    End,
}

static KEYWORDS: LazyLock<HashMap<&'static str, Keyword>> = LazyLock::new(|| {
    HashMap::from([
        ("ADDTEAM", Keyword::AddTeam),
        ("START", Keyword::Start),
        ("SUBMIT", Keyword::Submit),
        ("FLUSH", Keyword::Flush),
        ("FREEZE", Keyword::Freeze),
        ("SCROLL", Keyword::Scroll),
        ("QUERY_RANKING", Keyword::QueryRanking),
        ("QUERY_SUBMISSION", Keyword::QuerySubmission),
        ("END", Keyword::End),
    ])
});

const ALL: &str = "ALL";

pub fn keyword(word: &str) -> Option<Keyword> {
    KEYWORDS.get(word).copied()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddTeam {
        name: String,
    },
    Start {
        duration: i64,
        problem_count: usize,
    },
    Submit(Submission),
    Flush,
    Freeze,
    Scroll,
    QueryRanking {
        team: String,
    },
    QuerySubmission {
        team: String,
        problem: ProblemFilter,
        status: StatusFilter,
    },
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unknown command `{0}`")]
    UnknownKeyword(String),
    #[error("{keyword:?}: missing {field}")]
    MissingField {
        keyword: Keyword,
        field: &'static str,
    },
    #[error("{keyword:?}: expected `{expected}`, found `{found}`")]
    UnexpectedWord {
        keyword: Keyword,
        expected: &'static str,
        found: String,
    },
    #[error("{keyword:?}: `{value}` is not a valid {field}")]
    InvalidValue {
        keyword: Keyword,
        field: &'static str,
        value: String,
    },
}

struct Fields<'a> {
    keyword: Keyword,
    words: SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn next(&mut self, field: &'static str) -> Result<&'a str, LexError> {
        self.words.next().ok_or(LexError::MissingField {
            keyword: self.keyword,
            field,
        })
    }

    fn expect(&mut self, expected: &'static str) -> Result<(), LexError> {
        let found = self.next(expected)?;
        if found == expected {
            Ok(())
        } else {
            Err(self.unexpected(expected, found))
        }
    }

    /// Value of a `KEY=value` word.
    fn assignment(&mut self, prefix: &'static str) -> Result<&'a str, LexError> {
        let word = self.next(prefix)?;
        word.strip_prefix(prefix)
            .ok_or_else(|| self.unexpected(prefix, word))
    }

    fn integer<T: std::str::FromStr>(&mut self, field: &'static str) -> Result<T, LexError> {
        let word = self.next(field)?;
        word.parse().map_err(|_| self.invalid(field, word))
    }

    fn problem(&mut self) -> Result<char, LexError> {
        let word = self.next("problem")?;
        word.chars()
            .next()
            .filter(char::is_ascii_uppercase)
            .ok_or_else(|| self.invalid("problem", word))
    }

    fn verdict(&mut self) -> Result<Verdict, LexError> {
        let word = self.next("verdict")?;
        Verdict::from_keyword(word).ok_or_else(|| self.invalid("verdict", word))
    }

    fn unexpected(&self, expected: &'static str, found: &str) -> LexError {
        LexError::UnexpectedWord {
            keyword: self.keyword,
            expected,
            found: found.to_string(),
        }
    }

    fn invalid(&self, field: &'static str, value: &str) -> LexError {
        LexError::InvalidValue {
            keyword: self.keyword,
            field,
            value: value.to_string(),
        }
    }
}

/// Parses one input line. Blank lines yield `Ok(None)`; trailing words are ignored.
pub fn parse_command(line: &str) -> Result<Option<Command>, LexError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let keyword = keyword(head).ok_or_else(|| LexError::UnknownKeyword(head.to_string()))?;
    let mut fields = Fields { keyword, words };

    let command = match keyword {
        Keyword::AddTeam => Command::AddTeam {
            name: fields.next("team name")?.to_string(),
        },
        Keyword::Start => {
            fields.expect("DURATION")?;
            let duration = fields.integer("duration")?;
            fields.expect("PROBLEM")?;
            let problem_count = fields.integer("problem count")?;
            Command::Start {
                duration,
                problem_count,
            }
        }
        Keyword::Submit => {
            let problem = fields.problem()?;
            fields.expect("BY")?;
            let team = fields.next("team name")?.to_string();
            fields.expect("WITH")?;
            let verdict = fields.verdict()?;
            fields.expect("AT")?;
            let time = fields.integer("time")?;
            Command::Submit(Submission {
                team,
                problem,
                verdict,
                time,
            })
        }
        Keyword::Flush => Command::Flush,
        Keyword::Freeze => Command::Freeze,
        Keyword::Scroll => Command::Scroll,
        Keyword::QueryRanking => Command::QueryRanking {
            team: fields.next("team name")?.to_string(),
        },
        Keyword::QuerySubmission => {
            let team = fields.next("team name")?.to_string();
            fields.expect("WHERE")?;
            let problem = match fields.assignment("PROBLEM=")? {
                ALL => ProblemFilter::Any,
                letter => ProblemFilter::Problem(letter.chars().next().unwrap_or('?')),
            };
            fields.expect("AND")?;
            let status = match fields.assignment("STATUS=")? {
                ALL => StatusFilter::Any,
                word => Verdict::from_keyword(word).map_or_else(
                    || StatusFilter::Unrecognized(word.to_string()),
                    StatusFilter::Verdict,
                ),
            };
            Command::QuerySubmission {
                team,
                problem,
                status,
            }
        }
        Keyword::End => Command::End,
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse_command("   \t "), Ok(None));
    }

    #[test]
    fn parses_start_with_arbitrary_spacing() {
        assert_eq!(
            parse_command("START   DURATION 1000\tPROBLEM 12"),
            Ok(Some(Command::Start {
                duration: 1000,
                problem_count: 12
            }))
        );
    }

    #[test]
    fn parses_submit() {
        assert_eq!(
            parse_command("SUBMIT C BY team_7 WITH Time_Limit_Exceed AT 95"),
            Ok(Some(Command::Submit(Submission {
                team: "team_7".to_string(),
                problem: 'C',
                verdict: Verdict::TimeLimitExceed,
                time: 95,
            })))
        );
    }

    #[test]
    fn parses_query_submission_filters() {
        assert_eq!(
            parse_command("QUERY_SUBMISSION t WHERE PROBLEM=ALL AND STATUS=Accepted"),
            Ok(Some(Command::QuerySubmission {
                team: "t".to_string(),
                problem: ProblemFilter::Any,
                status: StatusFilter::Verdict(Verdict::Accepted),
            }))
        );
        assert_eq!(
            parse_command("QUERY_SUBMISSION t WHERE PROBLEM=B AND STATUS=ALL"),
            Ok(Some(Command::QuerySubmission {
                team: "t".to_string(),
                problem: ProblemFilter::Problem('B'),
                status: StatusFilter::Any,
            }))
        );
        assert_eq!(
            parse_command("QUERY_SUBMISSION t WHERE PROBLEM=A AND STATUS=Pending"),
            Ok(Some(Command::QuerySubmission {
                team: "t".to_string(),
                problem: ProblemFilter::Problem('A'),
                status: StatusFilter::Unrecognized("Pending".to_string()),
            }))
        );
    }

    #[test]
    fn reports_malformed_lines() {
        assert_eq!(
            parse_command("HELLO"),
            Err(LexError::UnknownKeyword("HELLO".to_string()))
        );
        assert_eq!(
            parse_command("ADDTEAM"),
            Err(LexError::MissingField {
                keyword: Keyword::AddTeam,
                field: "team name"
            })
        );
        assert!(matches!(
            parse_command("START DURATION ten PROBLEM 3"),
            Err(LexError::InvalidValue { field: "duration", .. })
        ));
        assert!(matches!(
            parse_command("SUBMIT A BY t WITH Compile_Error AT 3"),
            Err(LexError::InvalidValue { field: "verdict", .. })
        ));
        assert!(matches!(
            parse_command("SUBMIT A FROM t WITH Accepted AT 3"),
            Err(LexError::UnexpectedWord { expected: "BY", .. })
        ));
    }

    #[test]
    fn keyword_table_is_case_sensitive() {
        assert_eq!(keyword("SCROLL"), Some(Keyword::Scroll));
        assert_eq!(keyword("scroll"), None);
    }
}

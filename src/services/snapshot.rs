use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::services::contest::Contest;

/// Flushes `contest` and writes its standings to `path` as pretty JSON.
pub fn write_snapshot(path: &Path, contest: &mut Contest) -> Result<()> {
    let snapshot = contest.snapshot();
    let serialized =
        serde_json::to_string_pretty(&snapshot).context("Failed to serialize final standings")?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, serialized)
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;

    info!(
        "Wrote {} standings rows to {}",
        snapshot.standings.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Verdict;
    use crate::services::submission_processor::Submission;

    #[test]
    fn writes_flushed_standings() {
        let mut contest = Contest::new(20);
        contest.add_team("slow").unwrap();
        contest.add_team("fast").unwrap();
        contest.start(60, 1).unwrap();
        contest.submit(&Submission {
            team: "fast".to_string(),
            problem: 'A',
            verdict: Verdict::Accepted,
            time: 9,
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("final.json");
        write_snapshot(&path, &mut contest).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["board"], "Unfrozen");
        assert_eq!(value["phase"]["Running"]["problem_count"], 1);
        assert_eq!(value["standings"][0]["name"], "fast");
        assert_eq!(value["standings"][0]["rank"], 1);
        assert_eq!(value["standings"][0]["cells"][0], "+");
        assert_eq!(value["standings"][1]["penalty"], 0);
    }
}

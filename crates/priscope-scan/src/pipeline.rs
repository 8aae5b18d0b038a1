use chrono::Utc;
use indicatif::ProgressBar;
use priscope_core::{AnalysisOutcome, PullRequestRecord, RepoRef};

use crate::github::{GitHubClient, PrSelection, RetrievalOutcome};
use crate::llm::OllamaClient;
use crate::prompt;
use crate::report::{self, ScanReport};

/// Orchestrator for one scan invocation.
///
/// Drives retrieval → per-PR analysis → classification → report, strictly
/// sequentially. Retrieval order is preserved all the way into the report.
pub struct ScanPipeline {
    github: GitHubClient,
    llm: OllamaClient,
}

impl ScanPipeline {
    /// Create a pipeline from the two clients.
    pub fn new(github: GitHubClient, llm: OllamaClient) -> Self {
        Self { github, llm }
    }

    /// Run a full scan of `repo` and build the report.
    ///
    /// A retrieval abort degrades to an empty record set with a warning; the
    /// run still ends in a report. Per-PR inference failures come back as
    /// synthetic analysis strings and are counted suspicious, so no single
    /// PR can stop the loop.
    pub async fn scan(
        &self,
        repo: &RepoRef,
        selection: PrSelection,
        progress: Option<&ProgressBar>,
    ) -> ScanReport {
        if let Some(pb) = progress {
            pb.set_message(format!("Fetching merged PRs for {repo}"));
        }

        let records = match self.github.retrieve(repo, selection).await {
            RetrievalOutcome::Complete(records) => records,
            RetrievalOutcome::Aborted { reason } => {
                eprintln!("warning: retrieval aborted: {reason}");
                Vec::new()
            }
        };

        let mut outcomes = Vec::with_capacity(records.len());
        for record in &records {
            if let Some(pb) = progress {
                pb.set_message(format!("Analyzing PR #{}", record.number));
            }
            let analysis = self.llm.analyze(record).await;
            outcomes.push(build_outcome(repo, record, analysis));
        }

        report::build_report(repo, outcomes, Utc::now())
    }
}

/// Assemble one outcome from a record and the model's response text.
///
/// The link is derived from the repository and PR number; the status from
/// the classification rule.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use priscope_core::{AnalysisStatus, PullRequestRecord, RepoRef};
/// use priscope_scan::pipeline::build_outcome;
///
/// let repo = RepoRef::from_url("https://github.com/acme/widget").unwrap();
/// let record = PullRequestRecord {
///     number: 11,
///     title: "Add feature".into(),
///     description: None,
///     merged_at: Utc::now(),
///     diff: None,
/// };
/// let outcome = build_outcome(&repo, &record, "No issues identified.".into());
/// assert_eq!(outcome.status, AnalysisStatus::Clean);
/// assert_eq!(outcome.link, "https://github.com/acme/widget/pull/11");
/// ```
pub fn build_outcome(repo: &RepoRef, record: &PullRequestRecord, analysis: String) -> AnalysisOutcome {
    let status = prompt::classify_analysis(&analysis);
    AnalysisOutcome {
        number: record.number,
        title: record.title.clone(),
        merge_date: record.merged_at,
        link: repo.pr_url(record.number),
        analysis,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use priscope_core::AnalysisStatus;

    fn record(number: u64, title: &str, day: u32) -> PullRequestRecord {
        PullRequestRecord {
            number,
            title: title.into(),
            description: Some("description".into()),
            merged_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            diff: Some("+added line".into()),
        }
    }

    #[test]
    fn outcome_carries_record_fields() {
        let repo = RepoRef::from_url("https://github.com/acme/widget").unwrap();
        let rec = record(10, "Fix login", 1);
        let outcome = build_outcome(&repo, &rec, "No issues identified.".into());
        assert_eq!(outcome.number, 10);
        assert_eq!(outcome.title, "Fix login");
        assert_eq!(outcome.merge_date, rec.merged_at);
    }

    #[test]
    fn scan_scenario_two_prs_one_suspicious() {
        // Two retrieved PRs, the model flags the second: the report keeps
        // retrieval order, counts one suspicious, and derives the link from
        // owner/name/number.
        let repo = RepoRef::from_url("https://github.com/acme/widget").unwrap();
        let records = vec![record(10, "Fix login", 1), record(11, "Add feature", 2)];
        let analyses = [
            "No issues identified.".to_string(),
            "Hardcoded API key found in diff.".to_string(),
        ];

        let outcomes: Vec<AnalysisOutcome> = records
            .iter()
            .zip(analyses)
            .map(|(rec, analysis)| build_outcome(&repo, rec, analysis))
            .collect();
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        let report = report::build_report(&repo, outcomes, now);

        assert_eq!(report.total_prs_analyzed, 2);
        assert_eq!(report.suspicious_prs_count, 1);
        assert_eq!(report.analyzed_prs[0].number, 10);
        assert_eq!(report.analyzed_prs[0].status, AnalysisStatus::Clean);
        assert_eq!(report.analyzed_prs[1].number, 11);
        assert_eq!(report.analyzed_prs[1].status, AnalysisStatus::Suspicious);
        assert_eq!(
            report.analyzed_prs[1].link,
            "https://github.com/acme/widget/pull/11"
        );
    }

    #[test]
    fn synthetic_error_counts_suspicious() {
        let repo = RepoRef::from_url("https://github.com/acme/widget").unwrap();
        let rec = record(12, "Bump deps", 3);
        let outcome = build_outcome(&repo, &rec, "Error analyzing PR: 500".into());
        assert_eq!(outcome.status, AnalysisStatus::Suspicious);
    }
}

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use priscope_core::{AnalysisOutcome, AnalysisStatus, PriscopeError, RepoRef};
use serde::{Deserialize, Serialize};

/// Summary report for one scan run.
///
/// Built once at the end of a run via [`build_report`], which computes the
/// summary counts from the outcomes so the invariants
/// `total_prs_analyzed == analyzed_prs.len()` and
/// `suspicious_prs_count == #suspicious` hold by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Repository that was scanned, as `owner/name`.
    pub repository: String,
    /// When the scan ran.
    pub scan_date: DateTime<Utc>,
    /// Number of PRs analyzed.
    pub total_prs_analyzed: usize,
    /// Number of PRs classified suspicious.
    pub suspicious_prs_count: usize,
    /// Per-PR outcomes, in retrieval order.
    pub analyzed_prs: Vec<AnalysisOutcome>,
}

/// Aggregate per-PR outcomes into a report.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use priscope_core::RepoRef;
/// use priscope_scan::report::build_report;
///
/// let repo = RepoRef::from_url("https://github.com/acme/widget").unwrap();
/// let report = build_report(&repo, Vec::new(), Utc::now());
/// assert_eq!(report.repository, "acme/widget");
/// assert_eq!(report.total_prs_analyzed, 0);
/// ```
pub fn build_report(
    repo: &RepoRef,
    outcomes: Vec<AnalysisOutcome>,
    scan_date: DateTime<Utc>,
) -> ScanReport {
    let suspicious_prs_count = outcomes
        .iter()
        .filter(|o| o.status == AnalysisStatus::Suspicious)
        .count();
    ScanReport {
        repository: repo.to_string(),
        scan_date,
        total_prs_analyzed: outcomes.len(),
        suspicious_prs_count,
        analyzed_prs: outcomes,
    }
}

/// File name for the persisted JSON report:
/// `priscope_report_<repo>_<YYYYMMDD_HHMMSS>.json`.
pub fn report_filename(report: &ScanReport) -> String {
    let name = report
        .repository
        .rsplit('/')
        .next()
        .unwrap_or(&report.repository);
    format!(
        "priscope_report_{}_{}.json",
        name,
        report.scan_date.format("%Y%m%d_%H%M%S")
    )
}

/// Write the report as pretty-printed JSON into `output_dir`, creating the
/// directory if needed. Returns the path of the written file.
///
/// # Errors
///
/// Returns [`PriscopeError::Io`] on filesystem failures or
/// [`PriscopeError::Serialization`] if the report cannot be serialized.
pub fn write_json_report(report: &ScanReport, output_dir: &Path) -> Result<PathBuf, PriscopeError> {
    if !output_dir.exists() {
        std::fs::create_dir_all(output_dir)?;
    }
    let path = output_dir.join(report_filename(report));
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, content)?;
    Ok(path)
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.analyzed_prs {
            match outcome.status {
                AnalysisStatus::Clean => {
                    writeln!(f, "PR #{} -> No issues", outcome.number)?;
                }
                AnalysisStatus::Suspicious => {
                    writeln!(f, "PR #{} -> Potential Issue", outcome.number)?;
                    writeln!(f, "PR Title: {}", outcome.title)?;
                    writeln!(f, "PR Link: {}", outcome.link)?;
                    writeln!(
                        f,
                        "PR Merge Date: {}",
                        outcome.merge_date.format("%Y-%m-%d %H:%M:%S")
                    )?;
                    writeln!(f, "Finding: {}", outcome.analysis)?;
                }
            }
        }

        writeln!(f, "\nAnalysis Summary")?;
        writeln!(f, "{:=<20}", "")?;
        writeln!(f, "Number of PRs analyzed: {}", self.total_prs_analyzed)?;
        writeln!(f, "Number of suspicious PRs: {}", self.suspicious_prs_count)?;
        Ok(())
    }
}

impl ScanReport {
    /// Render the report as markdown.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use priscope_core::RepoRef;
    /// use priscope_scan::report::build_report;
    ///
    /// let repo = RepoRef::from_url("https://github.com/acme/widget").unwrap();
    /// let md = build_report(&repo, Vec::new(), Utc::now()).to_markdown();
    /// assert!(md.contains("# PR Security Scan"));
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# PR Security Scan — `{}`\n\n", self.repository));
        out.push_str(&format!(
            "**Scan date:** {} | **PRs analyzed:** {} | **Suspicious:** {}\n\n",
            self.scan_date.format("%Y-%m-%d %H:%M:%S"),
            self.total_prs_analyzed,
            self.suspicious_prs_count,
        ));

        if self.analyzed_prs.is_empty() {
            out.push_str("No pull requests analyzed.\n");
            return out;
        }

        for outcome in &self.analyzed_prs {
            let label = match outcome.status {
                AnalysisStatus::Clean => "clean",
                AnalysisStatus::Suspicious => "suspicious",
            };
            out.push_str(&format!(
                "## [#{}]({}) {} — {label}\n\n",
                outcome.number, outcome.link, outcome.title,
            ));
            out.push_str(&format!(
                "Merged {}\n\n",
                outcome.merge_date.format("%Y-%m-%d %H:%M:%S")
            ));
            if outcome.status == AnalysisStatus::Suspicious {
                out.push_str(&format!("> {}\n\n", outcome.analysis));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn repo() -> RepoRef {
        RepoRef::from_url("https://github.com/acme/widget").unwrap()
    }

    fn outcome(number: u64, status: AnalysisStatus) -> AnalysisOutcome {
        AnalysisOutcome {
            number,
            title: format!("PR {number}"),
            merge_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            link: repo().pr_url(number),
            analysis: match status {
                AnalysisStatus::Clean => "No issues identified.".into(),
                AnalysisStatus::Suspicious => "Hardcoded API key found in diff.".into(),
            },
            status,
        }
    }

    #[test]
    fn report_invariants_hold() {
        let outcomes = vec![
            outcome(10, AnalysisStatus::Clean),
            outcome(11, AnalysisStatus::Suspicious),
            outcome(12, AnalysisStatus::Suspicious),
        ];
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let report = build_report(&repo(), outcomes, now);
        assert_eq!(report.total_prs_analyzed, report.analyzed_prs.len());
        assert_eq!(report.suspicious_prs_count, 2);
    }

    #[test]
    fn empty_report_has_zero_counts() {
        let report = build_report(&repo(), Vec::new(), Utc::now());
        assert_eq!(report.total_prs_analyzed, 0);
        assert_eq!(report.suspicious_prs_count, 0);
        assert!(report.analyzed_prs.is_empty());
    }

    #[test]
    fn outcomes_keep_retrieval_order() {
        let outcomes = vec![
            outcome(10, AnalysisStatus::Clean),
            outcome(11, AnalysisStatus::Suspicious),
        ];
        let report = build_report(&repo(), outcomes, Utc::now());
        let numbers: Vec<u64> = report.analyzed_prs.iter().map(|o| o.number).collect();
        assert_eq!(numbers, vec![10, 11]);
    }

    #[test]
    fn filename_embeds_repo_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 5).unwrap();
        let report = build_report(&repo(), Vec::new(), now);
        assert_eq!(
            report_filename(&report),
            "priscope_report_widget_20240601_093005.json"
        );
    }

    #[test]
    fn json_report_has_expected_keys() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let report = build_report(&repo(), vec![outcome(11, AnalysisStatus::Suspicious)], now);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["repository"], "acme/widget");
        assert_eq!(json["total_prs_analyzed"], 1);
        assert_eq!(json["suspicious_prs_count"], 1);
        assert_eq!(json["analyzed_prs"][0]["number"], 11);
        assert_eq!(json["analyzed_prs"][0]["status"], "suspicious");
    }

    #[test]
    fn write_json_report_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let report = build_report(&repo(), vec![outcome(10, AnalysisStatus::Clean)], now);

        let path = write_json_report(&report, dir.path()).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: ScanReport = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.repository, "acme/widget");
        assert_eq!(parsed.total_prs_analyzed, 1);
    }

    #[test]
    fn write_json_report_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports/out");
        let report = build_report(&repo(), Vec::new(), Utc::now());
        let path = write_json_report(&report, &nested).unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[test]
    fn text_rendering_lists_findings_and_summary() {
        let outcomes = vec![
            outcome(10, AnalysisStatus::Clean),
            outcome(11, AnalysisStatus::Suspicious),
        ];
        let report = build_report(&repo(), outcomes, Utc::now());
        let text = format!("{report}");
        assert!(text.contains("PR #10 -> No issues"));
        assert!(text.contains("PR #11 -> Potential Issue"));
        assert!(text.contains("PR Link: https://github.com/acme/widget/pull/11"));
        assert!(text.contains("Number of PRs analyzed: 2"));
        assert!(text.contains("Number of suspicious PRs: 1"));
    }

    #[test]
    fn markdown_rendering_links_suspicious_prs() {
        let report = build_report(
            &repo(),
            vec![outcome(11, AnalysisStatus::Suspicious)],
            Utc::now(),
        );
        let md = report.to_markdown();
        assert!(md.contains("# PR Security Scan"));
        assert!(md.contains("https://github.com/acme/widget/pull/11"));
        assert!(md.contains("> Hardcoded API key found in diff."));
    }
}

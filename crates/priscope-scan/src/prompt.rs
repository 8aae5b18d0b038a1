use priscope_core::{AnalysisStatus, PullRequestRecord};

/// The marker phrase the model is instructed to answer with when a PR is
/// clean. Classification is a loose substring match on this phrase.
pub const CLEAN_MARKER: &str = "No issues identified";

const INSTRUCTIONS: &str = "\
Carefully analyze the following pull request for actual security risks or \
malicious code changes. Focus only on significant security issues, such as \
the introduction of vulnerabilities, hardcoded secrets, backdoors, insecure \
configurations, or risky dependencies.

If the changes do not represent a clear and actionable security risk, \
respond only with: \"No issues identified.\"

Only provide a brief summary if a security risk or malicious change is \
clearly identified and explain why it is a risk, based on concrete \
indicators such as unsafe functions, insecure patterns, or sensitive data \
exposure.";

/// Build the risk-assessment prompt for one pull request.
///
/// An absent description or diff renders as empty.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use priscope_core::PullRequestRecord;
/// use priscope_scan::prompt::build_analysis_prompt;
///
/// let record = PullRequestRecord {
///     number: 10,
///     title: "Fix login".into(),
///     description: None,
///     merged_at: Utc::now(),
///     diff: Some("+let x = 1;".into()),
/// };
/// let prompt = build_analysis_prompt(&record);
/// assert!(prompt.contains("PR Number: 10"));
/// assert!(prompt.contains("+let x = 1;"));
/// ```
pub fn build_analysis_prompt(record: &PullRequestRecord) -> String {
    format!(
        "{INSTRUCTIONS}\n\n\
         PR Number: {}\n\
         Title: {}\n\
         Description: {}\n\n\
         Code Changes:\n{}\n",
        record.number,
        record.title,
        record.description.as_deref().unwrap_or(""),
        record.diff.as_deref().unwrap_or(""),
    )
}

/// Classify an analysis response.
///
/// Clean iff the text contains the exact substring `"No issues identified"`,
/// case-sensitive and position-agnostic; anything else is suspicious. A
/// model phrasing the all-clear differently is therefore counted as
/// suspicious — the trade is documented in the tests, not fixed here.
///
/// # Examples
///
/// ```
/// use priscope_core::AnalysisStatus;
/// use priscope_scan::prompt::classify_analysis;
///
/// assert_eq!(classify_analysis("No issues identified."), AnalysisStatus::Clean);
/// assert_eq!(
///     classify_analysis("Hardcoded API key found in diff."),
///     AnalysisStatus::Suspicious
/// );
/// ```
pub fn classify_analysis(analysis: &str) -> AnalysisStatus {
    if analysis.contains(CLEAN_MARKER) {
        AnalysisStatus::Clean
    } else {
        AnalysisStatus::Suspicious
    }
}

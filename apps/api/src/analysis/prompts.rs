use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which canned analysis to run against the resume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Experience level, projects, ATS score, readability, job roles, name and age.
    #[default]
    Comprehensive,
    /// Only the three best-fitting job titles.
    JobTitles,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 2] = [AnalysisKind::Comprehensive, AnalysisKind::JobTitles];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Comprehensive => "comprehensive",
            AnalysisKind::JobTitles => "job_titles",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisKind::Comprehensive => "Full resume report",
            AnalysisKind::JobTitles => "Top 3 job titles",
        }
    }

    /// The fixed instruction sent as the query for this analysis.
    pub fn prompt(&self) -> &'static str {
        match self {
            AnalysisKind::Comprehensive => COMPREHENSIVE_PROMPT,
            AnalysisKind::JobTitles => JOB_TITLES_PROMPT,
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "comprehensive" => Ok(AnalysisKind::Comprehensive),
            "job_titles" => Ok(AnalysisKind::JobTitles),
            other => Err(format!("Unknown analysis '{other}'")),
        }
    }
}

/// Multi-criteria report on the uploaded resume.
pub const COMPREHENSIVE_PROMPT: &str = "Based on this resume or CV, perform the following:
1. Experience Analysis: Determine the total years of experience and categorize the candidate as Junior, Mid-level, or Senior.
2. Extract top 3 projects or accomplishments listed in the resume.
3. ATS Compatibility Score: Provide a score out of 10 based on formatting, keyword usage, and structure.
4. Readability and Clarity Rating: Rate the clarity of the resume on a scale of 1 to 10.
5. Job Roles: Tell the top 3 JOB roles this candidate is perfect for in a numbering manner.
6. Name and Age: Show the name and age if available.
NOTE: If there is any content except Resume or CV, provide a polite answer to upload a CV for analysis.";

/// Short list of job titles.
pub const JOB_TITLES_PROMPT: &str = "Based on this resume or CV, tell the top 3 JOB titles this candidate is best suited for, as a numbered list with one short reason each.
NOTE: If there is any content except Resume or CV, provide a polite answer to upload a CV for analysis.";

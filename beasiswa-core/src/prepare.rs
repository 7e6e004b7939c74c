//! Record preparation helpers for upstream pipelines.
//!
//! These derive the categorical fields and the eligibility flag that
//! [`ScholarshipRecord`](crate::record::ScholarshipRecord) expects from the
//! free-text columns of a scholarship listing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fund types that make a scholarship eligible.
pub const FUNDABLE_TYPES: &[&str] = &["full", "partial", "tuition only"];

/// Minimum normalized grade average for eligibility.
pub const MIN_GRADE_AVERAGE: f64 = 0.5;

/// Keep ASCII alphanumerics, whitespace and `-`; trim and lower-case.
pub fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// Map a free-text funding description to `full`, `partial`, `tuition only` or `other`.
pub fn classify_fund(text: &str) -> &'static str {
    let text = text.to_lowercase();
    if text.contains("full") {
        "full"
    } else if text.contains("partial") {
        "partial"
    } else if text.contains("tuition") {
        "tuition only"
    } else {
        "other"
    }
}

/// Map a free-text degree list to a study level.
pub fn extract_study_level(text: &str) -> &'static str {
    let text = text.to_lowercase();
    if text.contains("bachelor") {
        "Undergraduate"
    } else if text.contains("master") {
        "Postgraduate"
    } else if text.contains("phd") {
        "Doctoral"
    } else {
        "Other"
    }
}

/// Inputs to the eligibility rule for one student/scholarship pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    /// Application deadline, if the listing had a parseable one.
    pub deadline: Option<NaiveDate>,
    /// Output of [`classify_fund`].
    pub fund_type: String,
    /// Student's grade average, normalized to [0, 1].
    pub grade_average: f64,
}

impl Eligibility {
    /// Days from `today` until the deadline; `None` without a deadline.
    pub fn days_until_deadline(&self, today: NaiveDate) -> Option<i64> {
        self.deadline.map(|d| (d - today).num_days())
    }

    /// Deadline still ahead, fund type fundable, grade average high enough.
    pub fn is_eligible(&self, today: NaiveDate) -> bool {
        let open = matches!(self.days_until_deadline(today), Some(days) if days > 0);
        open && FUNDABLE_TYPES.contains(&self.fund_type.as_str())
            && self.grade_average >= MIN_GRADE_AVERAGE
    }
}

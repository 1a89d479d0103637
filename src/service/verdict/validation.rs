//! Verdict extraction from free-text adjudicator responses

use std::sync::LazyLock;

use regex::Regex;

use super::error::ServiceError;
use crate::model::Verdict;

/// Explicit `FINAL VERDICT: ...` line, tolerating markdown emphasis and headings
static FINAL_VERDICT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[\s*#>_-]*FINAL[\s_-]+VERDICT[\s*_]*:[\s*_]*(APPROVE|REJECT|INVESTIGATE[\s_-]+FURTHER)\b",
    )
    .expect("final verdict pattern is valid")
});

static VERDICT_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(APPROVE|REJECT|INVESTIGATE[\s_-]+FURTHER)\b")
        .expect("verdict keyword pattern is valid")
});

/// Read the verdict out of a response
///
/// A `FINAL VERDICT:` line decides when present. Otherwise the response must
/// mention exactly one distinct verdict keyword.
pub fn parse_verdict(response: &str) -> Result<Verdict, ServiceError> {
    if let Some(captures) = FINAL_VERDICT_LINE.captures(response) {
        return Ok(keyword_to_verdict(&captures[1]));
    }

    let mut found: Vec<Verdict> = VERDICT_KEYWORD
        .find_iter(response)
        .map(|m| keyword_to_verdict(m.as_str()))
        .collect();
    found.sort_by_key(|v| v.to_string());
    found.dedup();

    match found.as_slice() {
        [verdict] => Ok(*verdict),
        _ => Err(ServiceError::UnrecognizedVerdict),
    }
}

fn keyword_to_verdict(keyword: &str) -> Verdict {
    let keyword = keyword.to_ascii_uppercase();
    if keyword.starts_with("APPROVE") {
        Verdict::Approve
    } else if keyword.starts_with("REJECT") {
        Verdict::Reject
    } else {
        Verdict::InvestigateFurther
    }
}

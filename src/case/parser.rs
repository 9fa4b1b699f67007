use crate::case::model::CaseId;
use regex::Regex;
use std::sync::OnceLock;

fn case_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bC(\d+)\b").expect("case pattern is valid"))
}

/// Returns every case referenced in `title`, in order of first appearance.
pub fn extract_case_ids(title: &str) -> Vec<CaseId> {
    let mut found: Vec<CaseId> = Vec::new();
    case_pattern()
        .captures_iter(title)
        .filter_map(|captures| captures.get(1))
        .filter_map(|digits| digits.as_str().parse::<u64>().ok())
        .filter_map(CaseId::new)
        .for_each(|case_id| {
            if !found.contains(&case_id) {
                found.push(case_id);
            }
        });
    found
}

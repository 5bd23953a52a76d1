use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use super::{RuleKind, ValidationIssue};

/// Days a deprecated script may linger before its header becomes invalid.
const DEPRECATION_GRACE_DAYS: i64 = 90;

lazy_static! {
    static ref SINCE: Regex = Regex::new(r"@since\s+(\d{4}-\d{2}-\d{2})").unwrap();
    static ref VERSION: Regex = Regex::new(r"@version\s+(\S+)").unwrap();
    static ref DEPRECATED: Regex =
        Regex::new(r"@deprecatedSince\s+(\d{4}-\d{2}-\d{2})").unwrap();
}

/// Parsed metadata header of an automation script.
#[derive(Debug, Clone, Default)]
pub struct ArtifactHeader {
    pub since: Option<NaiveDate>,
    pub version: Option<String>,
    pub deprecated_since: Option<NaiveDate>,
}

pub fn parse_header(source: &str) -> ArtifactHeader {
    let date = |re: &Regex| {
        re.captures(source)
            .and_then(|c| c.get(1))
            .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
    };

    ArtifactHeader {
        since: date(&SINCE),
        version: VERSION
            .captures(source)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()),
        deprecated_since: date(&DEPRECATED),
    }
}

/// Header rule: `@since` and `@version` are required; a `@deprecatedSince`
/// older than the 90-day grace window is an error, within the window it is
/// informational only.
pub(crate) fn check_header(
    source: &str,
    today: NaiveDate,
    issues: &mut Vec<ValidationIssue>,
    notes: &mut Vec<String>,
) -> ArtifactHeader {
    let header = parse_header(source);

    if header.since.is_none() {
        issues.push(ValidationIssue::error(
            RuleKind::Header,
            "Missing @since date in header",
        ));
    }
    if header.version.is_none() {
        issues.push(ValidationIssue::error(
            RuleKind::Header,
            "Missing @version tag in header",
        ));
    }

    if let Some(date) = header.deprecated_since {
        let elapsed = (today - date).num_days();
        if elapsed > DEPRECATION_GRACE_DAYS {
            issues.push(ValidationIssue::error(
                RuleKind::Header,
                format!("deprecated since {date} ({elapsed} days ago) >90 days ago"),
            ));
        } else {
            notes.push(format!(
                "deprecated since {date}, {} day(s) of grace remaining",
                DEPRECATION_GRACE_DAYS - elapsed
            ));
        }
    }

    header
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn check(source: &str, today: NaiveDate) -> (Vec<ValidationIssue>, Vec<String>) {
        let mut issues = Vec::new();
        let mut notes = Vec::new();
        check_header(source, today, &mut issues, &mut notes);
        (issues, notes)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    #[test]
    fn missing_version_has_exact_message() {
        let (issues, _) = check("# @since 2026-01-01\n", today());
        assert!(issues
            .iter()
            .any(|i| i.message == "Missing @version tag in header"));
    }

    #[test]
    fn missing_since_is_an_error() {
        let (issues, _) = check("# @version 1.0.0\n", today());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("@since"));
    }

    #[test]
    fn deprecation_boundary_sits_at_ninety_days() {
        let base = "# @since 2025-01-01\n# @version 1.0.0\n# @deprecatedSince {d}\n";

        let at = |days: i64| {
            let date = today() - Duration::days(days);
            check(&base.replace("{d}", &date.to_string()), today())
        };

        // 89 days ago: valid, informational note only.
        let (issues, notes) = at(89);
        assert!(issues.is_empty());
        assert_eq!(notes.len(), 1);

        // 90 days ago: still within the window.
        let (issues, _) = at(90);
        assert!(issues.is_empty());

        // 91 days ago: invalid.
        let (issues, _) = at(91);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains(">90 days ago"));
    }
}

use super::text::{clean_lines, url_host, url_tokens};
use super::SiteFinding;

/// Status recorded for URLs listed by a profile-list tool.
pub const LISTED_STATUS: &str = "listed";

/// Every URL token on every line is an independent finding, bracket markup ignored.
pub fn parse(stdout: &str) -> Vec<SiteFinding> {
    let mut findings = Vec::new();
    for line in clean_lines(stdout) {
        for token in url_tokens(&line) {
            findings.push(SiteFinding {
                site: url_host(token),
                exists: true,
                url: Some(token.to_string()),
                status: LISTED_STATUS.to_string(),
            });
        }
    }
    findings
}

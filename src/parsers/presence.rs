//! Presence-scan parser for `[Site] status` and `[+] Site: url` output.
use super::text::{clean_lines, url_host, url_tokens, without_urls};
use super::SiteFinding;

/// Markers that always mean "not registered".
const NEGATIVE_MARKERS: &[&str] = &["-", "x"];
/// Markers that carry progress or warnings, never a record.
const INFO_MARKERS: &[&str] = &["*", "!", "?", ""];

/// Parse presence-scan output.
///
/// `keywords` are lowercase status texts meaning the account exists;
/// `markers` are bracket contents (`+`) meaning the same for marker lines.
pub fn parse(stdout: &str, keywords: &[String], markers: &[String]) -> Vec<SiteFinding> {
    clean_lines(stdout)
        .iter()
        .filter_map(|line| parse_line(line, keywords, markers))
        .collect()
}

fn parse_line(line: &str, keywords: &[String], markers: &[String]) -> Option<SiteFinding> {
    let rest = &line[line.find('[')? + 1..];
    let close = rest.find(']')?;
    let inner = rest[..close].trim();
    let tail = rest[close + 1..].trim();

    // Legends and usage lines carry several bracketed markers.
    if has_bracket_pair(tail) {
        return None;
    }
    if markers.iter().any(|m| m == inner) {
        return marker_record(inner, tail, true);
    }
    if NEGATIVE_MARKERS.contains(&inner) {
        return marker_record(inner, tail, false);
    }
    if INFO_MARKERS.contains(&inner) {
        return None;
    }

    let url = url_tokens(tail).first().map(|u| u.to_string());
    let status = clean_status(&without_urls(tail));
    if status.is_empty() {
        return None;
    }
    let exists = keywords.iter().any(|k| *k == status.to_lowercase());

    Some(SiteFinding {
        site: inner.to_string(),
        exists,
        url,
        status,
    })
}

fn marker_record(marker: &str, tail: &str, exists: bool) -> Option<SiteFinding> {
    let url = url_tokens(tail).first().map(|u| u.to_string());
    let name = clean_status(&without_urls(tail));
    let site = match (name.is_empty(), &url) {
        (false, _) => name,
        (true, Some(url)) => url_host(url),
        (true, None) => return None,
    };

    Some(SiteFinding {
        site,
        exists,
        url,
        status: format!("[{}]", marker),
    })
}

fn has_bracket_pair(text: &str) -> bool {
    text.find('[')
        .is_some_and(|open| text[open..].contains(']'))
}

fn clean_status(text: &str) -> String {
    text.trim()
        .trim_end_matches(':')
        .trim_start_matches(':')
        .trim()
        .to_string()
}

//! Text cleanup shared by the line-oriented parsers.
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

static ANSI_RE: OnceLock<Regex> = OnceLock::new();
static URL_RE: OnceLock<Regex> = OnceLock::new();

fn ansi_re() -> &'static Regex {
    ANSI_RE.get_or_init(|| {
        Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]|\x1b\][^\x07]*\x07").expect("valid ansi pattern")
    })
}

fn url_re() -> &'static Regex {
    URL_RE.get_or_init(|| {
        Regex::new(r#"https?://[^\s"'<>\[\]()]+"#).expect("valid url pattern")
    })
}

/// Remove terminal color and cursor escape sequences.
pub fn strip_ansi(input: &str) -> Cow<'_, str> {
    ansi_re().replace_all(input, "")
}

/// Clean lines of output. Carriage returns count as line breaks so progress
/// bar redraws do not glue records together.
pub fn clean_lines(input: &str) -> Vec<String> {
    strip_ansi(input)
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every `http(s)://` token in the line, in order, without trailing punctuation.
pub fn url_tokens(line: &str) -> Vec<&str> {
    url_re()
        .find_iter(line)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']))
        .filter(|token| !token.ends_with("://"))
        .collect()
}

/// Host part of a URL, falling back to the raw token.
pub fn url_host(token: &str) -> String {
    url::Url::parse(token)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| token.to_string())
}

/// Remove URL tokens from a line, leaving the surrounding text.
pub fn without_urls(line: &str) -> String {
    url_re().replace_all(line, "").to_string()
}

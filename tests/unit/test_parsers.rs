use osint_aggregator::parsers::{self, json, key_value, presence, profile_list, ToolFindings};
use osint_aggregator::tools::{OutputFormat, ToolId, ToolSpec};
use serde_json::json;

fn sherlock_keywords() -> Vec<String> {
    ToolSpec::default_for(ToolId::Sherlock).affirmative_keywords
}

#[test]
fn test_presence_exists_and_not_found() {
    let findings = presence::parse(
        "[ExampleSite] Exists\n[ExampleSite] Not Found\n",
        &sherlock_keywords(),
        &["+".to_string()],
    );
    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].site, "ExampleSite");
    assert!(findings[0].exists);
    assert_eq!(findings[0].status, "Exists");
    assert!(!findings[1].exists);
    assert_eq!(findings[1].status, "Not Found");
}

#[test]
fn test_presence_marker_lines() {
    let stdout = "\x1b[32m[+]\x1b[0m GitHub: https://github.com/alice\n\
                  [-] Instagram\n\
                  [*] Checking username alice on:\n\
                  [+] https://gitlab.com/alice\n";
    let findings = presence::parse(stdout, &sherlock_keywords(), &["+".to_string()]);

    assert_eq!(findings.len(), 3);
    assert_eq!(findings[0].site, "GitHub");
    assert_eq!(findings[0].url.as_deref(), Some("https://github.com/alice"));
    assert!(findings[0].exists);
    assert_eq!(findings[1].site, "Instagram");
    assert!(!findings[1].exists);
    assert_eq!(findings[2].site, "gitlab.com");
    assert_eq!(findings[2].status, "[+]");
}

#[test]
fn test_presence_keeps_duplicates_in_order() {
    let findings = presence::parse(
        "[Site] Exists\n[Other] Exists\n[Site] Exists\n",
        &sherlock_keywords(),
        &[],
    );
    let sites: Vec<&str> = findings.iter().map(|f| f.site.as_str()).collect();
    assert_eq!(sites, vec!["Site", "Other", "Site"]);
}

#[test]
fn test_holehe_run_ignores_legend_and_footer() {
    let stdout = "********************\n\
                  \x20  alice@example.com\n\
                  ********************\n\
                  [+] twitter.com\n\
                  [-] instagram.com\n\
                  [x] discord.com\n\
                  \n\
                  [+] Email used, [-] Email not used, [x] Rate limit, [!] Error\n\
                  121 websites checked in 10.52 seconds\n\
                  Twitter : @palenath\n\
                  Github : https://github.com/megadose/holehe\n";
    let holehe = ToolSpec::default_for(ToolId::Holehe);
    let findings = parsers::normalize(&holehe, stdout).unwrap();

    assert_eq!(findings.len(), 3);
    assert_eq!(findings.positive_count(), 1);
    let ToolFindings::Sites(sites) = findings else {
        panic!("holehe output should parse to site records");
    };
    let names: Vec<&str> = sites.iter().map(|f| f.site.as_str()).collect();
    assert_eq!(names, vec!["twitter.com", "instagram.com", "discord.com"]);
}

#[test]
fn test_presence_bracket_found_after_line_prefix() {
    let sherlock = ToolSpec::default_for(ToolId::Sherlock);
    let findings = parsers::normalize(&sherlock, "2024-01-01 [GitLab] Exists\n").unwrap();
    let ToolFindings::Sites(sites) = findings else {
        panic!("sherlock output should parse to site records");
    };
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].site, "GitLab");
    assert!(sites[0].exists);
}

#[test]
fn test_presence_bare_bracket_without_status_is_skipped() {
    let findings = presence::parse("[GitHub]\n[GitHub]   \n", &sherlock_keywords(), &[]);
    assert!(findings.is_empty());
}

#[test]
fn test_profile_list_two_urls_in_order() {
    let findings = profile_list::parse("check https://foo.test/alice and https://bar.test/alice");
    let urls: Vec<&str> = findings.iter().filter_map(|f| f.url.as_deref()).collect();
    assert_eq!(urls, vec!["https://foo.test/alice", "https://bar.test/alice"]);
    assert_eq!(findings[0].site, "foo.test");
    assert!(findings.iter().all(|f| f.exists));
}

#[test]
fn test_key_value_last_write_wins() {
    let profile = key_value::parse("Name: Alice\nGaia ID: 1234\nName: Alice B.\n");
    assert_eq!(profile.len(), 2);
    assert_eq!(profile["Name"], json!("Alice B."));
    let keys: Vec<&String> = profile.keys().collect();
    assert_eq!(keys, vec!["Name", "Gaia ID"]);
}

#[test]
fn test_json_rejects_malformed_document() {
    let err = json::parse("{\"name\": ").unwrap_err();
    assert!(err.to_string().starts_with("invalid JSON output"));
}

#[test]
fn test_empty_output_yields_empty_container_per_format() {
    for id in ToolId::DISPATCH_ORDER {
        let spec = ToolSpec::default_for(id);
        let findings = parsers::normalize(&spec, "").unwrap();
        assert!(findings.is_empty(), "{} should yield nothing", id);
        assert_eq!(findings, ToolFindings::empty_for(spec.output));
    }
}

#[test]
fn test_normalize_dispatches_on_output_format() {
    let mut spec = ToolSpec::default_for(ToolId::Ghunt);
    spec.output = OutputFormat::Json;
    let findings = parsers::normalize(&spec, r#"{"name": "Alice"}"#).unwrap();
    assert!(matches!(findings, ToolFindings::Profile(ref p) if p["name"] == json!("Alice")));

    let maigret = ToolSpec::default_for(ToolId::Maigret);
    let findings = parsers::normalize(&maigret, "[+] Reddit: https://reddit.com/u/alice").unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings.positive_count(), 1);
}

#[test]
fn test_parsers_are_deterministic() {
    let stdout = "[GitHub] Exists\r[GitLab] Not Found\nName: Alice\nhttps://x.test/a";
    for id in ToolId::DISPATCH_ORDER {
        let spec = ToolSpec::default_for(id);
        let first = parsers::normalize(&spec, stdout).unwrap();
        let second = parsers::normalize(&spec, stdout).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_findings_serialize_untagged() {
    let sites = presence::parse("[GitHub] Exists", &sherlock_keywords(), &[]);
    let value = serde_json::to_value(ToolFindings::Sites(sites)).unwrap();
    assert_eq!(value[0]["site"], "GitHub");
    assert_eq!(value[0]["exists"], true);
    assert_eq!(value[0]["url"], serde_json::Value::Null);
}

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;

use crate::core::{CheckResults, ScanResult};

lazy_static! {
    /// Swiss phone numbers, international (+41) or national (0xx) form.
    static ref PHONE_PATTERN: Regex = Regex::new(
        r"(\+41\s?\d{2}\s?\d{3}\s?\d{2}\s?\d{2}|0\d{2}\s?\d{3}\s?\d{2}\s?\d{2})"
    )
    .expect("phone pattern");
    /// Standalone four-digit token, used as a postal-code heuristic.
    static ref ADDRESS_PATTERN: Regex = Regex::new(r"\b\d{4}\b").expect("address pattern");
}

pub const CTA_KEYWORDS: [&str; 7] = [
    "jetzt", "kontakt", "termin", "angebot", "buchen", "anfragen", "melden",
];

pub const TITLE_MIN_CHARS: usize = 30;
pub const TITLE_MAX_CHARS: usize = 65;
pub const DESCRIPTION_MAX_CHARS: usize = 155;
pub const INTRO_MIN_CHARS: usize = 40;

#[derive(Debug, Clone, Copy)]
pub struct CheckInput<'a> {
    pub scan: &'a ScanResult,
    pub target_url: &'a str,
}

type Predicate = fn(&CheckInput<'_>) -> bool;

pub const CHECKS: &[(&str, Predicate)] = &[
    ("tech-title", tech_title),
    ("tech-description", tech_description),
    ("tech-og", tech_og),
    ("tech-canonical", tech_canonical),
    ("content-h1", content_h1),
    ("content-intro", content_intro),
    ("content-alt", content_alt),
    ("content-cta", content_cta),
    ("trust-contact", trust_contact),
    ("trust-legal", trust_legal),
    ("local-address", local_address),
    ("local-phone", local_phone),
];

pub fn evaluate(scan: &ScanResult, target_url: &str) -> CheckResults {
    let input = CheckInput { scan, target_url };
    let mut results = CheckResults::new();
    for &(id, check) in CHECKS {
        results.insert(id, check(&input));
    }
    results
}

/// Normalizes a URL for comparison: lower-cased scheme (default `http`)
/// and host, path without trailing slash except the root, query kept,
/// fragment dropped.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let (source, parsed) = match Url::parse(url) {
        Ok(parsed) => (url.to_string(), parsed),
        Err(_) => {
            let source = format!("http://{}", url.trim_start_matches('/'));
            let Ok(parsed) = Url::parse(&source) else {
                return url.to_string();
            };
            (source, parsed)
        }
    };
    let Some(host) = parsed.host_str() else {
        return url.to_string();
    };
    let host = host.to_lowercase();
    // `Url` hides a scheme's default port; a port written out is kept.
    let port = parsed
        .port()
        .or_else(|| has_explicit_port(&source).then(|| parsed.port_or_known_default()).flatten())
        .map(|p| format!(":{p}"))
        .unwrap_or_default();

    let mut path = parsed.path();
    if path != "/" {
        path = path.trim_end_matches('/');
    }
    if path.is_empty() {
        path = "/";
    }

    let mut out = format!("{}://{host}{port}{path}", parsed.scheme());
    if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
        out.push('?');
        out.push_str(query);
    }
    out
}

fn has_explicit_port(source: &str) -> bool {
    let rest = source.split_once("://").map_or(source, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    host_port
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
}

fn tech_title(input: &CheckInput<'_>) -> bool {
    let len = input.scan.title.chars().count();
    !input.scan.title.is_empty() && (TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len)
}

fn tech_description(input: &CheckInput<'_>) -> bool {
    match input.scan.meta_description.as_deref() {
        Some(d) if !d.is_empty() => d.chars().count() <= DESCRIPTION_MAX_CHARS,
        _ => false,
    }
}

fn tech_og(input: &CheckInput<'_>) -> bool {
    input.scan.og_image.as_deref().is_some_and(|s| !s.is_empty())
}

fn tech_canonical(input: &CheckInput<'_>) -> bool {
    match input.scan.canonical.as_deref() {
        Some(c) if !c.is_empty() => normalize_url(c) == normalize_url(input.target_url),
        _ => false,
    }
}

fn content_h1(input: &CheckInput<'_>) -> bool {
    input.scan.h1_texts.iter().any(|t| !t.trim().is_empty())
}

fn content_intro(input: &CheckInput<'_>) -> bool {
    input
        .scan
        .paragraph_texts
        .iter()
        .any(|t| t.trim().chars().count() >= INTRO_MIN_CHARS)
}

fn content_alt(input: &CheckInput<'_>) -> bool {
    input.scan.has_image_with_alt
}

fn content_cta(input: &CheckInput<'_>) -> bool {
    input.scan.cta_texts.iter().any(|text| {
        let lowered = text.to_lowercase();
        CTA_KEYWORDS.iter().any(|k| lowered.contains(k))
    })
}

fn trust_contact(input: &CheckInput<'_>) -> bool {
    PHONE_PATTERN.is_match(&input.scan.page_text)
        || input.scan.page_text.to_lowercase().contains("tel:")
}

fn trust_legal(input: &CheckInput<'_>) -> bool {
    input.scan.legal_link_found
}

fn local_address(input: &CheckInput<'_>) -> bool {
    ADDRESS_PATTERN.is_match(&input.scan.page_text)
}

fn local_phone(input: &CheckInput<'_>) -> bool {
    PHONE_PATTERN.is_match(&input.scan.page_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{DEFAULT_MAX_TEXT_CHARS, scan_html};

    const TARGET: &str = "https://example.ch/";

    fn check(scan: &ScanResult, id: &str) -> bool {
        evaluate(scan, TARGET).get(id).expect("known check id")
    }

    fn with_title(title: &str) -> ScanResult {
        ScanResult {
            title: title.to_string(),
            ..ScanResult::default()
        }
    }

    fn with_text(text: &str) -> ScanResult {
        ScanResult {
            page_text: text.to_string(),
            ..ScanResult::default()
        }
    }

    #[test]
    fn every_check_id_is_always_present() {
        let results = evaluate(&ScanResult::default(), TARGET);
        assert_eq!(results.len(), 12);
        for (id, _) in CHECKS {
            assert_eq!(results.get(id), Some(false), "{id}");
        }
    }

    #[test]
    fn title_passes_only_inside_length_window() {
        for len in 0..=80 {
            let scan = with_title(&"x".repeat(len));
            assert_eq!(check(&scan, "tech-title"), (30..=65).contains(&len), "len={len}");
        }
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        assert!(check(&with_title(&"ü".repeat(40)), "tech-title"));
    }

    #[test]
    fn forty_character_title_passes() {
        let scan = scan_html(
            "<title>A properly sized forty-character title here</title>",
            DEFAULT_MAX_TEXT_CHARS,
        );
        assert_eq!(scan.title, "A properly sized forty-character title here");
        assert!(check(&scan, "tech-title"));
    }

    #[test]
    fn description_passes_up_to_limit_and_requires_presence() {
        for len in [1, 100, 155, 156, 200] {
            let scan = ScanResult {
                meta_description: Some("d".repeat(len)),
                ..ScanResult::default()
            };
            assert_eq!(check(&scan, "tech-description"), len <= 155, "len={len}");
        }
        let empty = ScanResult {
            meta_description: Some(String::new()),
            ..ScanResult::default()
        };
        assert!(!check(&empty, "tech-description"));
        assert!(!check(&ScanResult::default(), "tech-description"));
    }

    #[test]
    fn og_image_must_be_non_empty() {
        let mut scan = ScanResult {
            og_image: Some(String::new()),
            ..ScanResult::default()
        };
        assert!(!check(&scan, "tech-og"));
        scan.og_image = Some("https://example.ch/og.png".to_string());
        assert!(check(&scan, "tech-og"));
    }

    #[test]
    fn canonical_compares_normalized_urls() {
        let mut scan = ScanResult {
            canonical: Some("HTTPS://Example.CH".to_string()),
            ..ScanResult::default()
        };
        assert!(check(&scan, "tech-canonical"));

        scan.canonical = Some("https://example.ch/andere-seite".to_string());
        assert!(!check(&scan, "tech-canonical"));

        scan.canonical = Some(String::new());
        assert!(!check(&scan, "tech-canonical"));
    }

    #[test]
    fn normalize_url_rules() {
        assert_eq!(normalize_url("HTTPS://Example.com/Path/"), "https://example.com/Path");
        assert_eq!(normalize_url("https://example.com"), "https://example.com/");
        assert_eq!(normalize_url("https://example.com/a/?b=1#top"), "https://example.com/a?b=1");
        assert_eq!(normalize_url("example.com/seite/"), "http://example.com/seite");
        assert_eq!(normalize_url("http://example.com:8080/x"), "http://example.com:8080/x");
    }

    #[test]
    fn written_default_port_is_kept() {
        assert_eq!(normalize_url("HTTPS://Example.ch:443/a/"), "https://example.ch:443/a");
        assert_ne!(
            normalize_url("https://example.ch:443/"),
            normalize_url("https://example.ch/")
        );
        assert_eq!(normalize_url("http://[::1]/x"), "http://[::1]/x");
    }

    #[test]
    fn normalize_url_is_idempotent() {
        for url in [
            "HTTPS://Example.com/Path/",
            "https://example.com",
            "https://example.com/a/?b=1#top",
            "example.com/seite/",
            "//cdn.example.com/x/",
            "http://example.com:8080/x//",
            "https://example.ch:443/",
            "not a url at all",
        ] {
            let once = normalize_url(url);
            assert_eq!(normalize_url(&once), once, "{url}");
        }
    }

    #[test]
    fn missing_h1_fails() {
        let scan = scan_html("<body><h2>Nur Unterüberschrift</h2></body>", DEFAULT_MAX_TEXT_CHARS);
        assert!(!check(&scan, "content-h1"));
        let scan = scan_html("<body><h1>Willkommen</h1></body>", DEFAULT_MAX_TEXT_CHARS);
        assert!(check(&scan, "content-h1"));
    }

    #[test]
    fn intro_needs_forty_trimmed_characters() {
        let mut scan = ScanResult {
            paragraph_texts: vec![format!("  {}  ", "a".repeat(39))],
            ..ScanResult::default()
        };
        assert!(!check(&scan, "content-intro"));
        scan.paragraph_texts.push("a".repeat(40));
        assert!(check(&scan, "content-intro"));
    }

    #[test]
    fn cta_matches_keywords_case_insensitively() {
        let mut scan = ScanResult {
            cta_texts: vec!["Mehr erfahren".to_string()],
            ..ScanResult::default()
        };
        assert!(!check(&scan, "content-cta"));
        scan.cta_texts.push("JETZT ANFRAGEN".to_string());
        assert!(check(&scan, "content-cta"));
    }

    #[test]
    fn swiss_phone_number_satisfies_contact_and_phone() {
        let scan = with_text("Rufen Sie uns an: +41 44 123 45 67");
        assert!(check(&scan, "local-phone"));
        assert!(check(&scan, "trust-contact"));

        let national = with_text("Telefon 044 123 45 67");
        assert!(check(&national, "local-phone"));
    }

    #[test]
    fn tel_marker_satisfies_contact_only() {
        let scan = with_text("Anrufen: TEL: siehe unten");
        assert!(check(&scan, "trust-contact"));
        assert!(!check(&scan, "local-phone"));
    }

    #[test]
    fn address_needs_standalone_four_digits() {
        assert!(check(&with_text("Bahnhofstrasse 1, 8001 Zürich"), "local-address"));
        assert!(!check(&with_text("Bestellnummer 123456"), "local-address"));
    }

    #[test]
    fn legal_check_reads_scanner_flag() {
        let positive = scan_html(
            r#"<body><a href="/datenschutz">Privacy</a></body>"#,
            DEFAULT_MAX_TEXT_CHARS,
        );
        assert!(check(&positive, "trust-legal"));
        let negative = scan_html(
            r#"<body><a href="/agb">AGB</a></body>"#,
            DEFAULT_MAX_TEXT_CHARS,
        );
        assert!(!check(&negative, "trust-legal"));
    }
}

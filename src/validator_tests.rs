// File: validator_tests.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#[cfg(test)]
mod tests {
    use crate::httpinner::HttpResponse;
    use crate::model::{BodyAssertions, HeaderAssertions, ResponseExpectation};
    use crate::validator::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn map(pairs: &[(&str, &str)]) -> std::collections::BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn messages(violations: &[Violation]) -> Vec<String> {
        violations.iter().map(ToString::to_string).collect()
    }

    fn json_response() -> HttpResponse {
        HttpResponse::new(200)
            .with_header("content-type", "application/json; charset=utf-8")
            .with_header("x-cache", "HIT")
            .with_body(r#"{"status":"ok"}"#)
    }

    #[rstest]
    #[case(100)]
    #[case(200)]
    #[case(404)]
    #[case(599)]
    fn test_empty_status_set_accepts_anything(#[case] status: u16) {
        let expected = ResponseExpectation::default();
        assert!(validate_response(&expected, &HttpResponse::new(status)).is_empty());
    }

    #[test]
    fn test_status_violation_message() {
        let expected = ResponseExpectation {
            status_codes: vec![200, 204],
            ..Default::default()
        };
        let violations = validate_response(&expected, &HttpResponse::new(500));
        assert_eq!(
            messages(&violations),
            vec!["unexpected status code - expected [200, 204], got 500"]
        );
        assert_eq!(violations[0].kind, ViolationKind::Status);
    }

    #[test]
    fn test_violations_accumulate() {
        let expected = ResponseExpectation {
            status_codes: vec![200],
            headers: HeaderAssertions {
                patterns: map(&[("content-type", "^text/html"), ("x-request-id", ".+")]),
                ..Default::default()
            },
            ..Default::default()
        };
        let response = HttpResponse::new(503).with_header("content-type", "application/json");

        let violations = validate_response(&expected, &response);

        assert_eq!(violations.len(), 3);
        assert_eq!(violations[0].kind, ViolationKind::Status);
        assert_eq!(violations[1].kind, ViolationKind::Header);
        assert_eq!(violations[2].kind, ViolationKind::Header);
    }

    #[test]
    fn test_header_patterns_are_case_insensitive() {
        let expected = ResponseExpectation {
            headers: HeaderAssertions {
                patterns: map(&[("Content-Type", "APPLICATION/JSON"), ("x-cache", "^hit$")]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_response(&expected, &json_response()).is_empty());
    }

    #[test]
    fn test_header_pattern_messages() {
        let expected = ResponseExpectation {
            headers: HeaderAssertions {
                patterns: map(&[("x-cache", "^MISS$"), ("x-missing", "abc")]),
                ..Default::default()
            },
            ..Default::default()
        };
        let violations = validate_response(&expected, &json_response());
        assert_eq!(
            messages(&violations),
            vec![
                r#"response header "x-cache" has value "HIT", which does not match pattern "^MISS$""#,
                r#"response header "x-missing" not found, expected to match pattern "abc""#,
            ]
        );
    }

    #[test]
    fn test_not_matching() {
        let expected = ResponseExpectation {
            headers: HeaderAssertions {
                not_matching: map(&[("x-cache", "hit"), ("content-type", "xml"), ("x-absent", "x")]),
                ..Default::default()
            },
            ..Default::default()
        };
        let violations = validate_response(&expected, &json_response());
        assert_eq!(
            messages(&violations),
            vec![
                r#"response header "x-absent" not found, expected to be present"#,
                r#"response header "x-cache" has value "HIT", which matches pattern "hit""#,
            ]
        );
    }

    #[test]
    fn test_not_present() {
        let expected = ResponseExpectation {
            headers: HeaderAssertions {
                not_present: vec!["x-cache".to_string(), "server".to_string(), "x-empty".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let response = json_response().with_header("x-empty", "");

        let violations = validate_response(&expected, &response);
        assert_eq!(messages(&violations), vec![r#"found unexpected response header "x-cache""#]);
    }

    #[test]
    fn test_if_present_not_matching_skips_absent_headers() {
        let expected = ResponseExpectation {
            headers: HeaderAssertions {
                if_present_not_matching: map(&[("x-absent", ".*"), ("x-cache", "^hit$")]),
                ..Default::default()
            },
            ..Default::default()
        };
        let violations = validate_response(&expected, &json_response());
        assert_eq!(
            messages(&violations),
            vec![r#"response header "x-cache" has value "HIT", which matches pattern "^hit$""#]
        );
    }

    #[test]
    fn test_body_pattern_against_plain_text() {
        let expected = ResponseExpectation {
            status_codes: vec![200],
            body: BodyAssertions {
                patterns: vec![r"^\{.*\}$".to_string()],
            },
            ..Default::default()
        };
        let response = HttpResponse::new(200).with_body("plain text");

        let violations = validate_response(&expected, &response);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::Body);
        assert!(violations[0].message.contains(r"^\{.*\}$"));
    }

    #[test]
    fn test_body_patterns_match_raw_bytes() {
        let expected = ResponseExpectation {
            body: BodyAssertions {
                patterns: vec!["STATUS".to_string(), r#""ok""#.to_string()],
            },
            ..Default::default()
        };
        assert!(validate_response(&expected, &json_response()).is_empty());

        let binary = HttpResponse::new(200).with_body(vec![0xff, b'o', b'k', 0xfe]);
        let expected = ResponseExpectation {
            body: BodyAssertions {
                patterns: vec!["ok".to_string()],
            },
            ..Default::default()
        };
        assert!(validate_response(&expected, &binary).is_empty());
    }

    #[test]
    fn test_invalid_patterns_become_violations() {
        let expected = ResponseExpectation {
            status_codes: vec![201],
            headers: HeaderAssertions {
                patterns: map(&[("x-cache", "(unclosed")]),
                ..Default::default()
            },
            body: BodyAssertions {
                patterns: vec!["[z-a]".to_string(), "ok".to_string()],
            },
        };
        let violations = validate_response(&expected, &json_response());

        let kinds: Vec<ViolationKind> = violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![ViolationKind::Status, ViolationKind::Pattern, ViolationKind::Pattern]
        );
        assert!(violations[1].message.starts_with("invalid test pattern `(unclosed`"));
    }

    #[test]
    fn test_compile_pattern_sets_case_insensitive_flag() {
        let regex = compile_pattern("^abc$").unwrap();
        assert!(regex.is_match("ABC"));
        assert!(compile_pattern("(").is_err());
    }

    #[test]
    fn test_multi_valued_header_matches_any_instance() {
        let response = HttpResponse::new(200)
            .with_header("content-type", "text/plain")
            .with_header("content-type", "application/json");
        let matching = ResponseExpectation {
            headers: HeaderAssertions {
                patterns: map(&[("content-type", "JSON")]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_response(&matching, &response).is_empty());

        let mismatching = ResponseExpectation {
            headers: HeaderAssertions {
                patterns: map(&[("content-type", "^text/html$")]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            messages(&validate_response(&mismatching, &response)),
            vec![
                r#"response header "content-type" has value "text/plain, application/json", which does not match pattern "^text/html$""#
            ]
        );
    }

    #[test]
    fn test_not_matching_checks_every_instance() {
        let response = HttpResponse::new(200)
            .with_header("via", "1.1 edge")
            .with_header("via", "1.1 varnish");
        let expected = ResponseExpectation {
            headers: HeaderAssertions {
                not_matching: map(&[("via", "varnish")]),
                if_present_not_matching: map(&[("via", "squid")]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            messages(&validate_response(&expected, &response)),
            vec![r#"response header "via" has value "1.1 varnish", which matches pattern "varnish""#]
        );
    }

    #[test]
    fn test_empty_header_value_counts_as_absent() {
        let response = HttpResponse::new(200).with_header("x-debug", "");
        let expected = ResponseExpectation {
            headers: HeaderAssertions {
                patterns: map(&[("x-debug", ".*")]),
                not_matching: map(&[("x-debug", ".*")]),
                not_present: vec!["x-debug".to_string()],
                if_present_not_matching: map(&[("x-debug", ".*")]),
            },
            ..Default::default()
        };
        assert_eq!(
            messages(&validate_response(&expected, &response)),
            vec![
                r#"response header "x-debug" not found, expected to match pattern ".*""#,
                r#"response header "x-debug" not found, expected to be present"#,
            ]
        );
    }
}

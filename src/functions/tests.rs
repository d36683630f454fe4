use super::*;
use rstest::*;

fn headers(pairs: &[(&str, &str)]) -> HeaderSet {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn refs(values: &[&str]) -> Vec<Arg> {
    values.iter().map(|v| Arg::from(*v)).collect()
}

#[cfg(test)]
mod registry_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Shout;

    #[async_trait]
    impl HeaderFunction for Shout {
        fn name(&self) -> &'static str {
            "shout"
        }

        async fn resolve(&self, headers: &HeaderSet, args: &[Arg]) -> Result<String, FunctionError> {
            Ok(concat::concat(headers, args).to_uppercase())
        }
    }

    #[test]
    fn test_registry_initialization() {
        let registry = FunctionRegistry::new();
        assert_eq!(
            registry.list(),
            vec![
                "basicAuth",
                "concat",
                "now",
                "postData",
                "postFormURLEncoded",
                "signStringRS256PKCS8",
            ]
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = FunctionRegistry::empty();
        assert!(registry.list().is_empty());
        assert!(!registry.contains("now"));
    }

    #[tokio::test]
    async fn test_unknown_function() {
        let registry = FunctionRegistry::new();
        let result = registry.resolve("nope", &HeaderSet::new(), &[]).await;
        match result {
            Err(FunctionError::UnknownFunction(name)) => assert_eq!(name, "nope"),
            other => panic!("expected unknown function error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_register_custom_function() {
        let mut registry = FunctionRegistry::empty();
        registry.register(Box::new(Shout));
        assert!(registry.contains("shout"));

        let value = registry
            .resolve("shout", &headers(&[("x-a", "abc")]), &refs(&["x-a", "-d"]))
            .await
            .unwrap();
        assert_eq!(value, "ABC-D");
    }

    #[tokio::test]
    async fn test_function_names_are_case_sensitive() {
        let registry = FunctionRegistry::new();
        assert!(registry.contains("basicAuth"));
        assert!(!registry.contains("basicauth"));
        assert!(registry.resolve("NOW", &HeaderSet::new(), &[]).await.is_err());
    }
}

#[cfg(test)]
mod concat_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case(&[], &[""], "")]
    #[case(&[], &["a", "b"], "ab")]
    #[case(&[("h", "X")], &["h", "-y"], "X-y")]
    #[case(&[("x-previous-header1", "value1")], &["x-previous-header2", "my string"], "x-previous-header2my string")]
    #[case(&[("x-previous-header1", "value1")], &["x-previous-header1", "-", "x-previous-header1"], "value1-value1")]
    fn test_concat(
        #[case] known: &[(&str, &str)],
        #[case] args: &[&str],
        #[case] expected: &str,
    ) {
        assert_eq!(concat::concat(&headers(known), &refs(args)), expected);
    }

    #[test]
    fn test_concat_literal_is_not_substituted() {
        let known = headers(&[("h", "X")]);
        let args = vec![Arg::Literal("h".to_string()), Arg::from("h")];
        assert_eq!(concat::concat(&known, &args), "hX");
    }
}

#[cfg(test)]
mod now_tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_now_is_current_epoch_seconds() {
        let before = Utc::now().timestamp();
        let value = FunctionRegistry::new()
            .resolve("now", &HeaderSet::new(), &refs(&["ignored"]))
            .await
            .unwrap();
        let after = Utc::now().timestamp();

        let seconds: i64 = value.parse().unwrap();
        assert!(seconds >= before && seconds <= after);
    }
}

#[cfg(test)]
mod basic_auth_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_basic_auth() {
        let registry = FunctionRegistry::new();
        let value = registry
            .resolve("basicAuth", &HeaderSet::new(), &refs(&["Aladdin", "open sesame"]))
            .await
            .unwrap();
        assert_eq!(value, "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[tokio::test]
    async fn test_basic_auth_reads_headers() {
        let registry = FunctionRegistry::new();
        let value = registry
            .resolve("basicAuth", &headers(&[("x-user", "Aladdin")]), &refs(&["x-user", "open sesame"]))
            .await
            .unwrap();
        assert_eq!(value, "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[tokio::test]
    async fn test_basic_auth_missing_password() {
        let registry = FunctionRegistry::new();
        let result = registry.resolve("basicAuth", &HeaderSet::new(), &refs(&["user"])).await;
        assert!(matches!(
            result,
            Err(FunctionError::MissingArguments { function: "basicAuth", expected: 2, .. })
        ));
    }
}

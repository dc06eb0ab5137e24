//! Regex construction for pattern-mode extraction.

use regex::Regex;

use crate::error::{EngineError, Result};

/// Build the extraction regexes: two per message function name (single- and
/// double-quoted first argument, matching across newlines), plus any raw
/// custom regexes from configuration. Each regex captures the candidate
/// message in group 1.
pub fn build_regexps(function_names: &[String], raw_regexps: &[String]) -> Result<Vec<Regex>> {
    let mut out = Vec::new();
    for name in function_names {
        let escaped = regex::escape(name);
        for quote in ['"', '\''] {
            // Matches `i18n("..."` / `i18n ( '...'`; later arguments to the
            // call are not parsed.
            let pattern = format!(r"{escaped}\s*\(\s*{quote}([\s\S]*?){quote}");
            out.push(
                Regex::new(&pattern).expect("escaped function name always forms a valid regex"),
            );
        }
    }
    for raw in raw_regexps {
        out.push(Regex::new(raw).map_err(|e| {
            EngineError::Validation(format!("invalid extraction regex {raw:?}: {e}"))
        })?);
    }
    Ok(out)
}

/// Run every regex over the full file text and collect the first capture
/// group of each match, in regex order then match order.
pub fn extract(content: &str, regexps: &[Regex]) -> Vec<String> {
    let mut out = Vec::new();
    for re in regexps {
        for captures in re.captures_iter(content) {
            if let Some(candidate) = captures.get(1) {
                out.push(candidate.as_str().to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::scanner::patterns::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matches_both_quote_styles() {
        let regexps = build_regexps(&names(&["_t"]), &[]).unwrap();
        let content = r#"
            const a = _t("greeting_Hello");
            const b = _t('farewell_Bye');
        "#;
        let mut found = extract(content, &regexps);
        found.sort();
        assert_eq!(found, vec!["farewell_Bye", "greeting_Hello"]);
    }

    #[test]
    fn test_matches_whitespace_and_newlines_in_call() {
        let regexps = build_regexps(&names(&["i18n"]), &[]).unwrap();
        let content = "i18n (\n  \"multi\nline message\"\n)";
        assert_eq!(extract(content, &regexps), vec!["multi\nline message"]);
    }

    #[test]
    fn test_dollar_in_function_name_is_literal() {
        let regexps = build_regexps(&names(&["$t"]), &[]).unwrap();
        let content = r#"$t("money") and t("not this one")"#;
        assert_eq!(extract(content, &regexps), vec!["money"]);
    }

    #[test]
    fn test_custom_regexps_run_alongside() {
        let regexps =
            build_regexps(&names(&["_t"]), &[r"translate!\(([^)]*)\)".to_string()]).unwrap();
        let content = r#"_t("one") translate!(two)"#;
        let found = extract(content, &regexps);
        assert_eq!(found, vec!["one", "two"]);
    }

    #[test]
    fn test_invalid_custom_regexp_is_rejected() {
        let result = build_regexps(&names(&["_t"]), &["([broken".to_string()]);
        assert!(matches!(
            result,
            Err(crate::error::EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_non_matching_content_yields_nothing() {
        let regexps = build_regexps(&names(&["_t"]), &[]).unwrap();
        assert!(extract("const x = 1;", &regexps).is_empty());
    }
}

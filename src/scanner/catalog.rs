//! Structured message catalog extraction.
//!
//! Two sources share the [`CatalogMessage`] shape:
//!
//! - **ICU catalog files**: JSON arrays of message descriptors
//!   (`{ "id": ..., "defaultMessage": ..., ... }`), consumed in structured
//!   scan mode.
//! - **Embedded declarations**: `defineMessage({...})` /
//!   `defineMessages({...})` call sites in JS/TS source, parsed with swc and
//!   consumed as a supplement to pattern mode.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use serde_json::Value;
use swc_common::{FileName, Globals, SourceMap, Span};
use swc_ecma_ast::{
    CallExpr, Callee, Expr, Lit, Module, ObjectLit, Prop, PropName, PropOrSpread,
};
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

use crate::model::SourceRange;

/// A message extracted with its catalog annotations, before it becomes a
/// key record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogMessage {
    /// The message text (the catalog's `defaultMessage`).
    pub text: String,
    /// External catalog id.
    pub id: Option<String>,
    pub description: Option<String>,
    pub range: Option<SourceRange>,
}

/// Extract descriptors from an ICU catalog file.
///
/// Only a top-level array is considered, and only its elements that carry
/// both `id` and `defaultMessage`; JSON files with any other shape yield
/// nothing, since arbitrary project JSON shares the extension.
pub fn extract_icu_json(content: &str) -> Result<Vec<CatalogMessage>, serde_json::Error> {
    let json: Value = serde_json::from_str(content)?;
    let Value::Array(items) = json else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for item in items {
        let Value::Object(obj) = item else { continue };
        let Some(id) = obj.get("id").and_then(Value::as_str) else {
            continue;
        };
        let Some(text) = obj.get("defaultMessage").and_then(Value::as_str) else {
            continue;
        };
        let description = obj
            .get("description")
            .and_then(Value::as_str)
            .map(String::from);
        let range = match (location(obj.get("start")), location(obj.get("end"))) {
            (Some((start_line, start_col)), Some((end_line, end_col))) => Some(SourceRange {
                start_line,
                start_col,
                end_line,
                end_col,
            }),
            _ => None,
        };
        out.push(CatalogMessage {
            text: text.to_string(),
            id: Some(id.to_string()),
            description,
            range,
        });
    }
    Ok(out)
}

fn location(value: Option<&Value>) -> Option<(usize, usize)> {
    let obj = value?.as_object()?;
    let line = obj.get("line")?.as_u64()? as usize;
    let column = obj.get("column")?.as_u64()? as usize;
    Some((line, column))
}

/// Parse a JS/TS source file and extract annotated message declarations.
///
/// Returns an error when the file does not parse; the caller logs it and
/// moves on — a broken file must never abort a scan.
pub fn extract_embedded(code: String, file_path: &str) -> Result<Vec<CatalogMessage>> {
    use swc_common::GLOBALS;

    GLOBALS.set(&Globals::new(), || {
        let source_map = Arc::new(SourceMap::default());
        let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        });

        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);
        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("failed to parse {}: {:?}", file_path, e))?;

        Ok(collect_messages(&module, &source_map))
    })
}

fn collect_messages(module: &Module, source_map: &SourceMap) -> Vec<CatalogMessage> {
    let mut visitor = CatalogVisitor {
        source_map,
        messages: Vec::new(),
    };
    module.visit_with(&mut visitor);
    visitor.messages
}

struct CatalogVisitor<'a> {
    source_map: &'a SourceMap,
    messages: Vec<CatalogMessage>,
}

impl CatalogVisitor<'_> {
    /// Record one descriptor object literal. Descriptors missing `id` or
    /// `defaultMessage` are not message declarations and are skipped.
    fn collect_descriptor(&mut self, obj: &ObjectLit) {
        let Some(id) = string_prop(obj, "id") else {
            return;
        };
        let Some(text) = string_prop(obj, "defaultMessage") else {
            return;
        };
        self.messages.push(CatalogMessage {
            text,
            id: Some(id),
            description: string_prop(obj, "description"),
            range: Some(self.range_of(obj.span)),
        });
    }

    fn range_of(&self, span: Span) -> SourceRange {
        let start = self.source_map.lookup_char_pos(span.lo);
        let end = self.source_map.lookup_char_pos(span.hi);
        SourceRange {
            start_line: start.line,
            start_col: start.col_display,
            end_line: end.line,
            end_col: end.col_display,
        }
    }
}

impl Visit for CatalogVisitor<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Callee::Expr(expr) = &node.callee
            && let Expr::Ident(ident) = &**expr
        {
            match ident.sym.as_str() {
                // defineMessage({ id, defaultMessage, ... })
                "defineMessage" => {
                    if let Some(arg) = node.args.first()
                        && let Expr::Object(obj) = &*arg.expr
                    {
                        self.collect_descriptor(obj);
                    }
                }
                // defineMessages({ key: { id, defaultMessage, ... }, ... })
                "defineMessages" => {
                    if let Some(arg) = node.args.first()
                        && let Expr::Object(obj) = &*arg.expr
                    {
                        for prop in &obj.props {
                            if let PropOrSpread::Prop(prop) = prop
                                && let Prop::KeyValue(kv) = &**prop
                                && let Expr::Object(inner) = &*kv.value
                            {
                                self.collect_descriptor(inner);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        node.visit_children_with(self);
    }
}

/// Look up a string-valued property of an object literal by name.
fn string_prop(obj: &ObjectLit, name: &str) -> Option<String> {
    for prop in &obj.props {
        if let PropOrSpread::Prop(prop) = prop
            && let Prop::KeyValue(kv) = &**prop
            && prop_name(&kv.key).as_deref() == Some(name)
            && let Expr::Lit(Lit::Str(s)) = &*kv.value
            && let Some(value) = s.value.as_str()
        {
            return Some(value.to_string());
        }
    }
    None
}

fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => s.value.as_str().map(|v| v.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::scanner::catalog::*;

    #[test]
    fn test_icu_json_array() {
        let content = r#"[
            {
                "id": "app.greeting",
                "defaultMessage": "Hello there",
                "description": "Shown on the landing page",
                "start": { "line": 12, "column": 4 },
                "end": { "line": 12, "column": 48 }
            },
            { "id": "app.farewell", "defaultMessage": "Bye" }
        ]"#;
        let messages = extract_icu_json(content).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "Hello there");
        assert_eq!(messages[0].id.as_deref(), Some("app.greeting"));
        assert_eq!(
            messages[0].description.as_deref(),
            Some("Shown on the landing page")
        );
        assert_eq!(
            messages[0].range,
            Some(SourceRange {
                start_line: 12,
                start_col: 4,
                end_line: 12,
                end_col: 48,
            })
        );
        assert_eq!(messages[1].range, None);
    }

    #[test]
    fn test_icu_json_ignores_non_catalog_shapes() {
        assert!(extract_icu_json(r#"{"just": "config"}"#).unwrap().is_empty());
        assert!(
            extract_icu_json(r#"[1, "two", {"id": "x"}, {"defaultMessage": "y"}]"#)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_icu_json_malformed_is_an_error() {
        assert!(extract_icu_json("{ nope").is_err());
    }

    #[test]
    fn test_embedded_define_message() {
        let code = r#"
            import { defineMessage } from "react-intl";
            const greeting = defineMessage({
                id: "app.greeting",
                defaultMessage: "Hello there",
                description: "Landing page greeting",
            });
        "#;
        let messages = extract_embedded(code.to_string(), "src/app.ts").unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "Hello there");
        assert_eq!(messages[0].id.as_deref(), Some("app.greeting"));
        assert_eq!(
            messages[0].description.as_deref(),
            Some("Landing page greeting")
        );
        let range = messages[0].range.unwrap();
        assert_eq!(range.start_line, 3);
        assert!(range.end_line >= range.start_line);
    }

    #[test]
    fn test_embedded_define_messages_map() {
        let code = r#"
            const messages = defineMessages({
                greeting: { id: "app.greeting", defaultMessage: "Hello" },
                farewell: { id: "app.farewell", defaultMessage: "Bye" },
            });
        "#;
        let messages = extract_embedded(code.to_string(), "src/messages.js").unwrap();
        let ids: Vec<_> = messages.iter().filter_map(|m| m.id.as_deref()).collect();
        assert_eq!(ids, vec!["app.greeting", "app.farewell"]);
    }

    #[test]
    fn test_embedded_skips_incomplete_descriptors() {
        let code = r#"
            defineMessage({ id: "missing.text" });
            defineMessage({ defaultMessage: "missing id" });
            defineMessage("not an object");
        "#;
        let messages = extract_embedded(code.to_string(), "src/a.js").unwrap();
        assert!(messages.is_empty());
    }

    #[test]
    fn test_embedded_parse_failure_is_an_error() {
        let result = extract_embedded("const = broken {{{".to_string(), "src/broken.js");
        assert!(result.is_err());
    }

    #[test]
    fn test_embedded_nested_calls_are_found() {
        let code = r#"
            export function Banner() {
                return render(defineMessage({ id: "b", defaultMessage: "Banner" }));
            }
        "#;
        let messages = extract_embedded(code.to_string(), "src/banner.tsx").unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "Banner");
    }
}

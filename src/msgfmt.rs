//! Compiles a message into a JavaScript formatter function.
//!
//! This handles the interpolation subset of the ICU MessageFormat syntax:
//! literal text, `{argName}` substitution, and apostrophe quoting (`''` is a
//! literal apostrophe, `'{'` quotes syntax characters). Plural/select forms
//! are passed through to consumers untouched by the non-goal of full ICU
//! validation, but structurally broken messages (unbalanced braces, bad
//! argument names) are rejected here so that compilation can fail loudly
//! instead of emitting broken bundles.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageSyntaxError {
    #[error("unbalanced brace at byte offset {0}")]
    UnbalancedBrace(usize),
    #[error("empty argument name at byte offset {0}")]
    EmptyArgument(usize),
    #[error("invalid character {1:?} in argument name at byte offset {0}")]
    InvalidArgument(usize, char),
    #[error("unterminated quoted text starting at byte offset {0}")]
    UnterminatedQuote(usize),
}

/// One piece of a parsed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Literal(String),
    Argument(String),
}

/// Parse a message into literal and argument parts.
pub fn parse(message: &str) -> Result<Vec<Part>, MessageSyntaxError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = message.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '\'' => match chars.peek().copied() {
                // '' is a literal apostrophe
                Some((_, '\'')) => {
                    chars.next();
                    literal.push('\'');
                }
                // 'x where x is a syntax character starts quoted text
                Some((_, '{' | '}')) => {
                    let mut closed = false;
                    for (_, qc) in chars.by_ref() {
                        if qc == '\'' {
                            closed = true;
                            break;
                        }
                        literal.push(qc);
                    }
                    if !closed {
                        return Err(MessageSyntaxError::UnterminatedQuote(offset));
                    }
                }
                // A lone apostrophe is literal text
                _ => literal.push('\''),
            },
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (noff, nc) in chars.by_ref() {
                    match nc {
                        '}' => {
                            closed = true;
                            break;
                        }
                        c if c.is_ascii_alphanumeric() || c == '_' => name.push(c),
                        c => return Err(MessageSyntaxError::InvalidArgument(noff, c)),
                    }
                }
                if !closed {
                    return Err(MessageSyntaxError::UnbalancedBrace(offset));
                }
                if name.is_empty() {
                    return Err(MessageSyntaxError::EmptyArgument(offset));
                }
                if !literal.is_empty() {
                    parts.push(Part::Literal(std::mem::take(&mut literal)));
                }
                parts.push(Part::Argument(name));
            }
            '}' => return Err(MessageSyntaxError::UnbalancedBrace(offset)),
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        parts.push(Part::Literal(literal));
    }
    Ok(parts)
}

/// Compile a message into a JavaScript expression over an `args` object,
/// e.g. `"Hi " + args["name"] + "!"`. Literal segments are emitted as JSON
/// string literals, which are valid JavaScript string literals.
pub fn compile_expr(message: &str) -> Result<String, MessageSyntaxError> {
    let parts = parse(message)?;
    if parts.is_empty() {
        return Ok("\"\"".to_string());
    }
    Ok(parts
        .iter()
        .map(|part| match part {
            Part::Literal(text) => {
                serde_json::to_string(text).expect("string serialization cannot fail")
            }
            Part::Argument(name) => format!("args[{}]", serde_json::to_string(name).unwrap()),
        })
        .collect::<Vec<_>>()
        .join(" + "))
}

/// Compile a message into the source of a JavaScript formatter function.
pub fn compile_to_js(message: &str) -> Result<String, MessageSyntaxError> {
    Ok(format!(
        "function (args) {{ return {}; }}",
        compile_expr(message)?
    ))
}

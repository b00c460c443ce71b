//! Message template rendering.
//!
//! Templates use `{name}` placeholders. `security_code` and `app` are
//! always available; any other name is looked up in the caller-supplied
//! context. A missing placeholder renders as the empty string rather
//! than failing the send. `{{` and `}}` are literal-brace escapes.

use std::collections::HashMap;

use crate::errors::ConfigError;

/// Substitutes placeholders into `template`.
///
/// `{security_code}` resolves to `security_code`, `{app}` to `app_name`,
/// and any other placeholder to the matching `context` entry or the
/// empty string when absent.
pub fn render(
    template: &str,
    security_code: &str,
    app_name: &str,
    context: &HashMap<String, String>,
) -> String {
    let mut out = String::with_capacity(template.len() + security_code.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    name.push(c);
                }
                match name.as_str() {
                    "security_code" => out.push_str(security_code),
                    "app" => out.push_str(app_name),
                    other => {
                        if let Some(value) = context.get(other) {
                            out.push_str(value);
                        }
                    }
                }
            }
            c => out.push(c),
        }
    }

    out
}

/// Checks `template` for syntax errors at configuration time.
///
/// Rejects unterminated placeholders, stray closing braces, and
/// placeholder names containing anything other than ASCII alphanumerics
/// and underscores. Empty names are rejected too.
pub fn validate_template(template: &str) -> Result<(), ConfigError> {
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
            }
            '}' => {
                return Err(ConfigError::InvalidTemplate {
                    reason: "stray '}' outside a placeholder".to_string(),
                });
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(ConfigError::InvalidTemplate {
                        reason: "unterminated placeholder".to_string(),
                    });
                }
                if name.is_empty() {
                    return Err(ConfigError::InvalidTemplate {
                        reason: "empty placeholder name".to_string(),
                    });
                }
                if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(ConfigError::InvalidTemplate {
                        reason: format!("invalid placeholder name: {:?}", name),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn renders_code_app_and_context_fields() {
        let rendered = render(
            "Code: {security_code} from {app}, note: {extra}",
            "123456",
            "TestApp",
            &context(&[("extra", "extra-info")]),
        );
        assert_eq!(rendered, "Code: 123456 from TestApp, note: extra-info");
    }

    #[test]
    fn missing_placeholder_renders_empty() {
        let rendered = render(
            "Hi {name}, your code is {security_code}",
            "000042",
            "App",
            &HashMap::new(),
        );
        assert_eq!(rendered, "Hi , your code is 000042");
    }

    #[test]
    fn escaped_braces_are_literal() {
        let rendered = render("{{literal}} {security_code}", "1234", "App", &HashMap::new());
        assert_eq!(rendered, "{literal} 1234");
    }

    #[test]
    fn validate_accepts_well_formed_templates() {
        assert!(validate_template("Welcome to {app}! Use {security_code} to proceed.").is_ok());
        assert!(validate_template("no placeholders at all").is_ok());
        assert!(validate_template("{{escaped}} braces").is_ok());
    }

    #[test]
    fn validate_rejects_broken_syntax() {
        assert!(matches!(
            validate_template("unterminated {security_code"),
            Err(ConfigError::InvalidTemplate { .. })
        ));
        assert!(matches!(
            validate_template("stray } brace"),
            Err(ConfigError::InvalidTemplate { .. })
        ));
        assert!(matches!(
            validate_template("empty {} name"),
            Err(ConfigError::InvalidTemplate { .. })
        ));
        assert!(matches!(
            validate_template("bad {na me} placeholder"),
            Err(ConfigError::InvalidTemplate { .. })
        ));
    }
}

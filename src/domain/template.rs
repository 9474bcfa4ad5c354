use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{ReleaseError, Result};

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{([^{}]*)\}").expect("placeholder regex is valid")
    })
}

/// A message template with positional placeholders.
///
/// `{}` takes the next argument in order, `{0}`/`{1}` pick one by index and
/// `{{`/`}}` produce literal braces. Used for `search_pattern`, `tag_message`
/// and `bump_message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub template: String,
}

impl MessageTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        MessageTemplate {
            template: template.into(),
        }
    }

    /// Substitute `args` into the template.
    ///
    /// # Errors
    /// Returns `InvalidInput` if a placeholder names an argument that was not
    /// supplied or is not a positional placeholder at all.
    pub fn render(&self, args: &[&str]) -> Result<String> {
        let mut next = 0usize;
        let mut failure: Option<ReleaseError> = None;

        let rendered = placeholder_regex().replace_all(&self.template, |caps: &Captures| {
            let whole = &caps[0];
            if whole == "{{" {
                return "{".to_string();
            }
            if whole == "}}" {
                return "}".to_string();
            }

            let spec = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            let index = if spec.is_empty() {
                next += 1;
                Some(next - 1)
            } else {
                spec.parse::<usize>().ok()
            };

            match index.and_then(|i| args.get(i)) {
                Some(value) => value.to_string(),
                None => {
                    failure.get_or_insert_with(|| {
                        ReleaseError::invalid_input(format!(
                            "template '{}' has placeholder '{}' but only {} argument(s) were given",
                            self.template,
                            whole,
                            args.len()
                        ))
                    });
                    String::new()
                }
            }
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(rendered.into_owned()),
        }
    }
}

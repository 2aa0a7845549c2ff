//! Positional Placeholder Substitution
//!
//! Fills `{0}`, `{1}`, ... in a template line from the fields of a
//! payload record:
//! - `{N}` is replaced by field `N`
//! - `{}` takes the next automatic index, starting at 0
//! - `{{` and `}}` produce literal braces
//!
//! Fields beyond the highest referenced index are ignored.

use thiserror::Error;

/// Why a template could not be filled from a payload record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("placeholder {{{index}}} out of range (record has {available} field(s))")]
    MissingField { index: usize, available: usize },

    #[error("unmatched brace at byte {position}")]
    UnmatchedBrace { position: usize },

    #[error("invalid placeholder {{{placeholder}}}")]
    InvalidPlaceholder { placeholder: String },
}

/// Substitutes payload fields into a template line.
///
/// # Example
///
/// ```
/// use multiplexer::tasks::template::substitute;
///
/// let fields = vec!["web01".to_string(), "22".to_string()];
/// let task = substitute("ssh -p {1} {0} uptime", &fields).unwrap();
/// assert_eq!(task, "ssh -p 22 web01 uptime");
/// ```
pub fn substitute(template: &str, fields: &[String]) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    let mut auto_index = 0;

    while let Some((position, ch)) = chars.next() {
        match ch {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    output.push('{');
                    continue;
                }

                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }

                if !closed {
                    return Err(TemplateError::UnmatchedBrace { position });
                }

                let index = if name.is_empty() {
                    auto_index += 1;
                    auto_index - 1
                } else {
                    name.trim()
                        .parse::<usize>()
                        .map_err(|_| TemplateError::InvalidPlaceholder { placeholder: name })?
                };

                let field = fields.get(index).ok_or(TemplateError::MissingField {
                    index,
                    available: fields.len(),
                })?;
                output.push_str(field);
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    output.push('}');
                } else {
                    return Err(TemplateError::UnmatchedBrace { position });
                }
            }
            _ => output.push(ch),
        }
    }

    Ok(output)
}

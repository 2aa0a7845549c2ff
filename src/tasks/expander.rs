//! Command Expansion
//!
//! Cross-joins template lines with payload records. Iteration is
//! template-major: every payload for the first template, then every
//! payload for the second, and so on.
//!
//! A pairing that fails substitution never aborts the expansion on its
//! own; the caller decides per pairing whether to skip it or stop.

use std::convert::Infallible;
use std::fmt;

use log::{debug, info, warn};

use super::input::PayloadRecord;
use super::template::{substitute, TemplateError};

/// A template/payload pairing that could not be substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPairing {
    pub template_index: usize,
    pub payload_index: usize,
    pub template: String,
    pub error: TemplateError,
}

impl fmt::Display for SkippedPairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "template line {} '{}' with payload record {}: {}",
            self.template_index + 1,
            self.template,
            self.payload_index + 1,
            self.error
        )
    }
}

/// What to do after a pairing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingAction {
    Skip,
    Abort,
}

/// Result of expanding templates against payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Fully substituted commands in template-major order
    pub tasks: Vec<String>,
    /// Pairings left out of `tasks`
    pub skipped: Vec<SkippedPairing>,
}

/// Expands every pairing, skipping the ones that fail substitution.
///
/// # Example
///
/// ```
/// use multiplexer::tasks::{expand, PayloadRecord};
///
/// let templates = vec!["echo {0}-{1}".to_string()];
/// let payloads = vec![PayloadRecord::new(["a", "1"]), PayloadRecord::new(["b", "2"])];
///
/// let expansion = expand(&templates, &payloads);
/// assert_eq!(expansion.tasks, vec!["echo a-1", "echo b-2"]);
/// ```
pub fn expand(templates: &[String], payloads: &[PayloadRecord]) -> Expansion {
    match expand_pairings(templates, payloads, Ok::<_, Infallible>) {
        Ok(expansion) => expansion,
        Err(never) => match never {},
    }
}

/// Expands every pairing, consulting `on_error` for each failed one.
///
/// Returns the failed pairing as the error when `on_error` answers
/// [`PairingAction::Abort`].
pub fn expand_with<F>(
    templates: &[String],
    payloads: &[PayloadRecord],
    mut on_error: F,
) -> Result<Expansion, SkippedPairing>
where
    F: FnMut(&SkippedPairing) -> PairingAction,
{
    expand_pairings(templates, payloads, |skipped| match on_error(&skipped) {
        PairingAction::Skip => Ok(skipped),
        PairingAction::Abort => Err(skipped),
    })
}

/// Cross-product loop shared by [`expand`] and [`expand_with`].
///
/// `on_error` hands back the pairing to record it as skipped, or an
/// error to stop.
fn expand_pairings<F, E>(
    templates: &[String],
    payloads: &[PayloadRecord],
    mut on_error: F,
) -> Result<Expansion, E>
where
    F: FnMut(SkippedPairing) -> Result<SkippedPairing, E>,
{
    let mut expansion = Expansion {
        tasks: Vec::with_capacity(templates.len() * payloads.len()),
        skipped: Vec::new(),
    };

    for (template_index, template) in templates.iter().enumerate() {
        for (payload_index, payload) in payloads.iter().enumerate() {
            match substitute(template, payload.fields()) {
                Ok(task) => {
                    debug!("Expanded task: {}", task);
                    expansion.tasks.push(task);
                }
                Err(error) => {
                    let skipped = SkippedPairing {
                        template_index,
                        payload_index,
                        template: template.clone(),
                        error,
                    };
                    warn!("Skipping {}", skipped);
                    expansion.skipped.push(on_error(skipped)?);
                }
            }
        }
    }

    info!(
        "Expanded {} template(s) x {} payload(s) into {} task(s) ({} skipped)",
        templates.len(),
        payloads.len(),
        expansion.tasks.len(),
        expansion.skipped.len()
    );

    Ok(expansion)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_expand_basic() {
        let payloads = vec![PayloadRecord::new(["a", "1"]), PayloadRecord::new(["b", "2"])];
        let expansion = expand(&templates(&["echo {0}-{1}"]), &payloads);

        assert_eq!(expansion.tasks, vec!["echo a-1", "echo b-2"]);
        assert!(expansion.skipped.is_empty());
    }

    #[test]
    fn test_expand_template_major_order() {
        let payloads = vec![PayloadRecord::new(["x"]), PayloadRecord::new(["y"])];
        let expansion = expand(&templates(&["ping {0}", "trace {0}"]), &payloads);

        assert_eq!(
            expansion.tasks,
            vec!["ping x", "ping y", "trace x", "trace y"]
        );
    }

    #[test]
    fn test_expand_malformed_pairing_skipped() {
        let payloads = vec![PayloadRecord::new(["only-one"])];
        let expansion = expand(&templates(&["echo {0} {1}"]), &payloads);

        assert!(expansion.tasks.is_empty());
        assert_eq!(expansion.skipped.len(), 1);
        assert_eq!(
            expansion.skipped[0].error,
            TemplateError::MissingField { index: 1, available: 1 }
        );
    }

    #[test]
    fn test_expand_bad_pairing_does_not_affect_others() {
        let payloads = vec![
            PayloadRecord::new(["a", "1"]),
            PayloadRecord::new(["only-one"]),
            PayloadRecord::new(["c", "3"]),
        ];
        let expansion = expand(&templates(&["echo {0} {1}", "echo {0}"]), &payloads);

        assert_eq!(
            expansion.tasks,
            vec!["echo a 1", "echo c 3", "echo a", "echo only-one", "echo c"]
        );
        assert_eq!(expansion.skipped.len(), 1);
        assert_eq!(expansion.skipped[0].template_index, 0);
        assert_eq!(expansion.skipped[0].payload_index, 1);
    }

    #[test]
    fn test_expand_with_abort() {
        let payloads = vec![PayloadRecord::new(["only-one"]), PayloadRecord::new(["a", "b"])];
        let result = expand_with(&templates(&["echo {0} {1}"]), &payloads, |_| {
            PairingAction::Abort
        });

        let skipped = result.unwrap_err();
        assert_eq!(skipped.payload_index, 0);
        assert_eq!(skipped.template, "echo {0} {1}");
    }

    #[test]
    fn test_expand_with_callback_sees_every_failure() {
        let payloads = vec![PayloadRecord::new(["one"]), PayloadRecord::new(["two"])];
        let mut seen = Vec::new();
        let expansion = expand_with(&templates(&["{0} {1}"]), &payloads, |pairing| {
            seen.push(pairing.payload_index);
            PairingAction::Skip
        })
        .unwrap();

        assert_eq!(seen, vec![0, 1]);
        assert_eq!(expansion.skipped.len(), 2);
    }

    #[test]
    fn test_expand_empty_inputs() {
        assert!(expand(&[], &[PayloadRecord::new(["a"])]).tasks.is_empty());
        assert!(expand(&templates(&["echo {0}"]), &[]).tasks.is_empty());
    }

    #[test]
    fn test_expand_with_every_pairing_failing() {
        let payloads = vec![PayloadRecord::new(["a"]), PayloadRecord::new(["b"])];
        let expansion = expand(&templates(&["echo {0} {1}", "echo {x}", "echo {0"]), &payloads);

        assert!(expansion.tasks.is_empty());
        assert_eq!(expansion.skipped.len(), 6);
        assert!(matches!(
            expansion.skipped[2].error,
            TemplateError::InvalidPlaceholder { .. }
        ));
        assert!(matches!(
            expansion.skipped[5].error,
            TemplateError::UnmatchedBrace { .. }
        ));
    }

    #[test]
    fn test_skipped_pairing_display() {
        let skipped = SkippedPairing {
            template_index: 0,
            payload_index: 2,
            template: "echo {0} {1}".to_string(),
            error: TemplateError::MissingField { index: 1, available: 1 },
        };
        let text = skipped.to_string();
        assert!(text.contains("template line 1"));
        assert!(text.contains("payload record 3"));
    }
}

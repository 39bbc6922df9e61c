//! Temporal constraint records
//!
//! Side-file input of the form
//! `[{"type": "must_finish_before", "module_ids": ["src", "tgt"]}]`.

use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::error::ComposeError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Constraint kind that becomes a graph edge
pub const MUST_FINISH_BEFORE: &str = "must_finish_before";

/// One external scheduling constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalConstraint {
    /// Constraint kind; only `must_finish_before` is acted on
    #[serde(rename = "type")]
    pub kind: String,
    /// Constrained module ids
    #[serde(default)]
    pub module_ids: Vec<String>,
}

impl TemporalConstraint {
    /// `must_finish_before` between two modules
    #[must_use]
    pub fn must_finish_before(src: impl Into<String>, tgt: impl Into<String>) -> Self {
        Self {
            kind: MUST_FINISH_BEFORE.to_string(),
            module_ids: vec![src.into(), tgt.into()],
        }
    }

    /// `(src, tgt)` if this is a well-formed `must_finish_before`
    #[must_use]
    pub fn ordering(&self) -> Option<(&str, &str)> {
        match (self.kind.as_str(), self.module_ids.as_slice()) {
            (MUST_FINISH_BEFORE, [src, tgt]) => Some((src, tgt)),
            _ => None,
        }
    }

    /// Whether this constraint is of the acted-on kind
    #[inline]
    #[must_use]
    pub fn is_must_finish_before(&self) -> bool {
        self.kind == MUST_FINISH_BEFORE
    }
}

/// Parse a JSON array of constraint records
///
/// # Errors
/// Returns [`ComposeError::ConstraintParse`] if the document is not a JSON
/// array of `{type, module_ids}` records
pub fn parse_constraints(text: &str) -> Result<Vec<TemporalConstraint>, ComposeError> {
    serde_json::from_str(text).map_err(ComposeError::ConstraintParse)
}

/// Read and parse a constraints file
///
/// # Errors
/// Returns [`ComposeError::Io`] if the file cannot be read, or
/// [`ComposeError::ConstraintParse`] if it is not valid
pub fn read_constraints(path: &Path) -> Result<Vec<TemporalConstraint>, ComposeError> {
    let text = fs::read_to_string(path).map_err(|e| ComposeError::io_error(path, e))?;
    let constraints = parse_constraints(&text)?;
    tracing::debug!(path = %path.display(), count = constraints.len(), "temporal constraints read");
    Ok(constraints)
}

/// Report `must_finish_before` records that do not name exactly two modules
pub(crate) fn check_shape(constraints: &[TemporalConstraint], diagnostics: &mut Diagnostics) {
    for constraint in constraints {
        if constraint.is_must_finish_before() && constraint.ordering().is_none() {
            diagnostics.record(
                Diagnostic::warning(
                    DiagnosticCode::MalformedConstraint,
                    format!(
                        "must_finish_before needs exactly 2 module ids, got {}",
                        constraint.module_ids.len()
                    ),
                )
                .with_context("module_ids", constraint.module_ids.join(",")),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_records_and_keeps_unknown_kinds() {
        let constraints = parse_constraints(
            r#"[
                {"type": "must_finish_before", "module_ids": ["mod-a", "mod-b"]},
                {"type": "same_day", "module_ids": ["mod-a", "mod-c"]}
            ]"#,
        )
        .unwrap();

        assert_eq!(constraints.len(), 2);
        assert_eq!(constraints[0].ordering(), Some(("mod-a", "mod-b")));
        assert_eq!(constraints[1].ordering(), None);
        assert!(!constraints[1].is_must_finish_before());
    }

    #[test]
    fn invalid_json_is_fatal() {
        let err = parse_constraints("{not json").unwrap_err();
        assert!(matches!(err, ComposeError::ConstraintParse(_)));
    }

    #[test]
    fn wrong_arity_is_reported() {
        let constraints = vec![
            TemporalConstraint {
                kind: MUST_FINISH_BEFORE.to_string(),
                module_ids: vec!["mod-a".to_string()],
            },
            TemporalConstraint::must_finish_before("mod-a", "mod-b"),
        ];
        let mut diagnostics = Diagnostics::new();
        check_shape(&constraints, &mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.has(DiagnosticCode::MalformedConstraint));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"type": "must_finish_before", "module_ids": ["a", "b"]}}]"#).unwrap();
        let constraints = read_constraints(file.path()).unwrap();
        assert_eq!(constraints, vec![TemporalConstraint::must_finish_before("a", "b")]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_constraints(Path::new("/nonexistent/constraints.json")).unwrap_err();
        assert!(matches!(err, ComposeError::Io { .. }));
    }
}

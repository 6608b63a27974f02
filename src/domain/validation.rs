//! Field constraints shared by the create and update flows.
//!
//! Validation collects every violation before rejecting, so a single response
//! reports all offending fields.

use serde::Serialize;

/// Upper bound for human-entered name/title fields, counted in characters.
pub const TEXT_FIELD_MAX_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate an author payload. `firstname` is optional but bounded when present.
pub fn validate_author(lastname: &str, firstname: Option<&str>) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();
    check_required(&mut violations, "lastname", lastname);
    if let Some(firstname) = firstname {
        check_max_length(&mut violations, "firstname", firstname);
    }
    finish(violations)
}

/// Validate a book payload. Only the title is constrained.
pub fn validate_book(title: &str) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();
    check_required(&mut violations, "title", title);
    finish(violations)
}

fn check_required(violations: &mut Vec<Violation>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        violations.push(Violation::new(field, format!("{field} must not be blank")));
        return;
    }
    check_max_length(violations, field, value);
}

fn check_max_length(violations: &mut Vec<Violation>, field: &'static str, value: &str) {
    if value.chars().count() > TEXT_FIELD_MAX_CHARS {
        violations.push(Violation::new(
            field,
            format!("{field} must be at most {TEXT_FIELD_MAX_CHARS} characters"),
        ));
    }
}

fn finish(violations: Vec<Violation>) -> Result<(), Vec<Violation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundary_length() {
        let lastname = "a".repeat(TEXT_FIELD_MAX_CHARS);
        assert!(validate_author(&lastname, None).is_ok());
    }

    #[test]
    fn rejects_blank_lastname() {
        let violations = validate_author("   ", None).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "lastname");
    }

    #[test]
    fn collects_every_violation() {
        let firstname = "b".repeat(TEXT_FIELD_MAX_CHARS + 1);
        let violations = validate_author("", Some(&firstname)).unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["lastname", "firstname"]);
    }

    #[test]
    fn rejects_overlong_title() {
        let title = "t".repeat(TEXT_FIELD_MAX_CHARS + 1);
        let violations = validate_book(&title).unwrap_err();
        assert_eq!(violations[0].field, "title");
        assert!(violations[0].message.contains("255"));
    }

    #[test]
    fn multibyte_titles_count_characters_not_bytes() {
        let title = "я".repeat(TEXT_FIELD_MAX_CHARS);
        assert!(validate_book(&title).is_ok());
    }
}

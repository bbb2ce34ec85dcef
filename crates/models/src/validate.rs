//! Field validators shared by the entity modules.

use sea_orm::prelude::Date;

use crate::errors::ModelError;

/// Trimmed, non-empty, at most `max` characters.
pub fn required_text(field: &str, value: &str, max: usize) -> Result<String, ModelError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ModelError::validation(format!("{field} required")));
    }
    if v.chars().count() > max {
        return Err(ModelError::validation(format!("{field} must be at most {max} characters")));
    }
    Ok(v.to_string())
}

/// Blank strings collapse to `None`.
pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>, ModelError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required_text(field, v, max).map(Some),
    }
}

pub fn email(value: &str) -> Result<String, ModelError> {
    let v = value.trim();
    let Some((local, domain)) = v.split_once('@') else {
        return Err(ModelError::validation("invalid email"));
    };
    if local.is_empty() || domain.is_empty() || v.len() > 255 {
        return Err(ModelError::validation("invalid email"));
    }
    Ok(v.to_ascii_lowercase())
}

pub fn date_range(start: Date, end: Date) -> Result<(), ModelError> {
    if start > end {
        return Err(ModelError::validation("start_date must not be after end_date"));
    }
    Ok(())
}

/// `inner` lies within `outer`, both inclusive.
pub fn within(inner: (Date, Date), outer: (Date, Date)) -> bool {
    inner.0 >= outer.0 && inner.1 <= outer.1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date { Date::from_ymd_opt(y, m, day).unwrap() }

    #[test]
    fn required_text_trims_and_bounds() {
        assert_eq!(required_text("name", "  Alpha ", 10).unwrap(), "Alpha");
        assert!(required_text("name", "   ", 10).is_err());
        assert!(required_text("name", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn optional_text_blank_is_none() {
        assert_eq!(optional_text("d", Some("  "), 10).unwrap(), None);
        assert_eq!(optional_text("d", None, 10).unwrap(), None);
        assert_eq!(optional_text("d", Some(" x "), 10).unwrap(), Some("x".into()));
    }

    #[test]
    fn email_rules() {
        assert_eq!(email(" Bob@Example.com ").unwrap(), "bob@example.com");
        assert!(email("bob").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("bob@").is_err());
    }

    #[test]
    fn ranges() {
        assert!(date_range(d(2024, 1, 1), d(2024, 1, 1)).is_ok());
        assert!(date_range(d(2024, 1, 2), d(2024, 1, 1)).is_err());
        assert!(within((d(2024, 2, 1), d(2024, 2, 10)), (d(2024, 1, 1), d(2024, 3, 1))));
        assert!(!within((d(2023, 12, 31), d(2024, 2, 10)), (d(2024, 1, 1), d(2024, 3, 1))));
    }
}

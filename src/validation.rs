//! Checks raw cell input against a column's type.
//!
//! Pure functions only; the value store calls [`validate`] before every
//! write.

use crate::db::models::ColumnType;
use crate::error::ValueError;

/// A raw value that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedValue {
    /// Empty input: the cell should be cleared.
    Clear,
    Text(String),
    Int(i64),
    Stars(f64),
}

impl ValidatedValue {
    /// Text to persist, or `None` when the cell should have no row.
    pub fn into_stored(self) -> Option<String> {
        match self {
            ValidatedValue::Clear => None,
            ValidatedValue::Text(text) => Some(text),
            ValidatedValue::Int(n) => Some(n.to_string()),
            ValidatedValue::Stars(stars) if stars.fract() == 0.0 => {
                Some(format!("{}", stars as i64))
            }
            ValidatedValue::Stars(stars) => Some(stars.to_string()),
        }
    }
}

pub fn validate(column_type: &ColumnType, raw: &str) -> Result<ValidatedValue, ValueError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(ValidatedValue::Clear);
    }

    match column_type {
        ColumnType::String => Ok(ValidatedValue::Text(trimmed.to_owned())),
        ColumnType::Int { min, max } => {
            let value: i64 = trimmed
                .parse()
                .map_err(|_| ValueError::NotANumber(trimmed.to_owned()))?;
            if value < *min {
                return Err(ValueError::BelowMinimum { value, min: *min });
            }
            if value > *max {
                return Err(ValueError::AboveMaximum { value, max: *max });
            }
            Ok(ValidatedValue::Int(value))
        }
        ColumnType::Stars => {
            let value: f64 = trimmed
                .parse()
                .map_err(|_| ValueError::NotANumber(trimmed.to_owned()))?;
            if !value.is_finite() {
                return Err(ValueError::NotANumber(trimmed.to_owned()));
            }
            if !(0.0..=ColumnType::STARS_MAX).contains(&value) {
                return Err(ValueError::StarsOutOfRange { value });
            }
            Ok(ValidatedValue::Stars(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_clears_for_every_type() {
        for ty in [ColumnType::String, ColumnType::Int { min: 0, max: 1 }, ColumnType::Stars] {
            assert_eq!(validate(&ty, "   "), Ok(ValidatedValue::Clear));
            assert_eq!(validate(&ty, ""), Ok(ValidatedValue::Clear));
        }
    }

    #[test]
    fn string_is_trimmed() {
        assert_eq!(
            validate(&ColumnType::String, "  PC \n"),
            Ok(ValidatedValue::Text("PC".into()))
        );
    }

    #[test]
    fn int_bounds_are_inclusive() {
        let ty = ColumnType::Int { min: 0, max: 100 };
        assert_eq!(validate(&ty, "0"), Ok(ValidatedValue::Int(0)));
        assert_eq!(validate(&ty, "100"), Ok(ValidatedValue::Int(100)));
        assert_eq!(
            validate(&ty, "-1"),
            Err(ValueError::BelowMinimum { value: -1, min: 0 })
        );
        assert_eq!(
            validate(&ty, "101"),
            Err(ValueError::AboveMaximum { value: 101, max: 100 })
        );
    }

    #[test]
    fn int_default_range_edges() {
        let ty = ColumnType::int(None, None).unwrap();
        let min = i32::MIN as i64;
        let max = i32::MAX as i64;
        assert!(validate(&ty, &min.to_string()).is_ok());
        assert!(validate(&ty, &max.to_string()).is_ok());
        assert!(validate(&ty, &(min - 1).to_string()).is_err());
        assert!(validate(&ty, &(max + 1).to_string()).is_err());
    }

    #[test]
    fn int_rejects_non_numbers() {
        let ty = ColumnType::Int { min: 0, max: 10 };
        assert_eq!(validate(&ty, "abc"), Err(ValueError::NotANumber("abc".into())));
        assert_eq!(validate(&ty, "4.5"), Err(ValueError::NotANumber("4.5".into())));
    }

    #[test]
    fn stars_accept_fractions_within_range() {
        assert_eq!(validate(&ColumnType::Stars, "3.5"), Ok(ValidatedValue::Stars(3.5)));
        assert_eq!(validate(&ColumnType::Stars, "5"), Ok(ValidatedValue::Stars(5.0)));
        assert_eq!(
            validate(&ColumnType::Stars, "5.5"),
            Err(ValueError::StarsOutOfRange { value: 5.5 })
        );
        assert_eq!(
            validate(&ColumnType::Stars, "NaN"),
            Err(ValueError::NotANumber("NaN".into()))
        );
    }

    #[test]
    fn validation_is_repeatable() {
        let ty = ColumnType::Int { min: 0, max: 100 };
        assert_eq!(validate(&ty, "85"), validate(&ty, "85"));
    }

    #[test]
    fn stored_text_normalises_numbers() {
        assert_eq!(ValidatedValue::Int(85).into_stored(), Some("85".into()));
        assert_eq!(ValidatedValue::Stars(4.0).into_stored(), Some("4".into()));
        assert_eq!(ValidatedValue::Stars(2.5).into_stored(), Some("2.5".into()));
        assert_eq!(ValidatedValue::Clear.into_stored(), None);
    }
}

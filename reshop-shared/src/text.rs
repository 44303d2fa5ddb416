//! Validation for free-text fields that end up in the pipe-delimited data file.
//!
//! The file format has no escaping, so a field holding the delimiter or a
//! line break would shift every following field on reload. Such values are
//! rejected at the point they enter the system.

/// Separator between fields of one persisted record.
pub const FIELD_DELIMITER: char = '|';

const RESERVED: [char; 3] = [FIELD_DELIMITER, '\n', '\r'];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Field '{0}' must not be empty")]
    Empty(&'static str),

    #[error("Field '{field}' contains a reserved character ('|' or a line break): {value:?}")]
    ReservedCharacter {
        field: &'static str,
        value: String,
    },
}

/// True when `value` could not be written to the data file verbatim.
pub fn has_reserved_chars(value: &str) -> bool {
    value.contains(&RESERVED[..])
}

/// Reject values containing the field delimiter or a line break.
pub fn check_field(field: &'static str, value: &str) -> Result<(), FieldError> {
    if has_reserved_chars(value) {
        return Err(FieldError::ReservedCharacter {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Like [`check_field`], but also rejects blank values.
pub fn check_required_field(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::Empty(field));
    }
    check_field(field, value)
}

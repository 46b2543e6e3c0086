//! Form-field map: the raw shape of every write operation.
//!
//! Writes arrive as a flat map of field name to string value (an HTML form
//! post). Records parse themselves out of this map so the rules for required
//! and optional fields live in one place.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Flat field-name to string-value map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and seeding.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw access to a field, untouched.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// A field that must be present and non-blank. Returned as submitted.
    pub fn required(&self, key: &str) -> DomainResult<&str> {
        self.optional(key)
            .ok_or_else(|| DomainError::invalid_input(format!("{key} is required")))
    }

    /// A field that may be absent. Blank values count as absent; anything else
    /// is returned as submitted, surrounding whitespace included.
    pub fn optional(&self, key: &str) -> Option<&str> {
        self.raw(key).filter(|v| !v.trim().is_empty())
    }

    /// Parse a required field with `FromStr`, reporting the field name on failure.
    pub fn parse_required<T>(&self, key: &str) -> DomainResult<T>
    where
        T: FromStr,
        T::Err: core::fmt::Display,
    {
        let value = self.required(key)?;
        value
            .trim()
            .parse::<T>()
            .map_err(|e| DomainError::invalid_input(format!("{key}: {e}")))
    }

    /// Parse an optional field with `FromStr`; blank values are `None`.
    pub fn parse_optional<T>(&self, key: &str) -> DomainResult<Option<T>>
    where
        T: FromStr,
        T::Err: core::fmt::Display,
    {
        self.optional(key)
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|e| DomainError::invalid_input(format!("{key}: {e}")))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        let fields = FormFields::new().with("name", "   ");
        assert_eq!(
            fields.required("name").unwrap_err(),
            DomainError::invalid_input("name is required")
        );
        assert_eq!(
            fields.required("product_id").unwrap_err(),
            DomainError::invalid_input("product_id is required")
        );
    }

    #[test]
    fn optional_treats_blank_as_absent() {
        let fields = FormFields::new().with("from_location", "").with("to_location", " L1 ");
        assert_eq!(fields.optional("from_location"), None);
        assert_eq!(fields.optional("to_location"), Some(" L1 "));
        assert_eq!(fields.optional("missing"), None);
    }

    #[test]
    fn free_text_keeps_surrounding_whitespace() {
        let fields = FormFields::new()
            .with("name", "Widget ")
            .with("description", "  indented\n");
        assert_eq!(fields.required("name").unwrap(), "Widget ");
        assert_eq!(fields.optional("description"), Some("  indented\n"));
    }

    #[test]
    fn parsed_fields_ignore_surrounding_whitespace() {
        let fields = FormFields::new().with("qty", " 12 ");
        assert_eq!(fields.parse_required::<i64>("qty").unwrap(), 12);
        assert_eq!(fields.parse_optional::<i64>("missing").unwrap(), None);
    }

    #[test]
    fn parse_required_reports_field_name() {
        let fields = FormFields::new().with("qty", "ten");
        let err = fields.parse_required::<i64>("qty").unwrap_err();
        match err {
            DomainError::InvalidInput(msg) => assert!(msg.starts_with("qty:"), "{msg}"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn deserializes_from_url_encoded_shape() {
        let fields: FormFields =
            serde_json::from_str(r#"{"product_id":"P1","name":"Widget"}"#).unwrap();
        assert_eq!(fields.required("product_id").unwrap(), "P1");
        assert_eq!(fields.required("name").unwrap(), "Widget");
    }

    proptest! {
        /// Property: any integer survives a render-then-parse through a form field,
        /// including surrounding whitespace.
        #[test]
        fn integers_parse_with_padding(n in any::<i64>(), pad in " {0,3}") {
            let fields = FormFields::new().with("qty", format!("{pad}{n}{pad}"));
            prop_assert_eq!(fields.parse_required::<i64>("qty").unwrap(), n);
        }
    }
}

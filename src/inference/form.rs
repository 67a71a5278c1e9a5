//! Form fields accepted by the prediction endpoint

use crate::error::{Result, SalesError};
use crate::preprocessing::{RawRecord, RawValue};
use std::collections::HashMap;

/// How a form field is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Kept as text and label-encoded
    Categorical,
    /// Parsed as a float
    Numeric,
}

/// One expected form field and the record column it feeds
#[derive(Debug, Clone, Copy)]
pub struct FormField {
    pub name: &'static str,
    pub column: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

/// Expected fields, in the order they are read
pub const FORM_FIELDS: [FormField; 8] = [
    FormField { name: "platform", column: "Platform", label: "Platform", kind: FieldKind::Categorical },
    FormField { name: "genre", column: "Genre", label: "Genre", kind: FieldKind::Categorical },
    FormField { name: "publisher", column: "Publisher", label: "Publisher", kind: FieldKind::Categorical },
    FormField { name: "year", column: "Year", label: "Year", kind: FieldKind::Numeric },
    FormField { name: "na_sales", column: "NA_Sales", label: "NA Sales (millions)", kind: FieldKind::Numeric },
    FormField { name: "eu_sales", column: "EU_Sales", label: "EU Sales (millions)", kind: FieldKind::Numeric },
    FormField { name: "jp_sales", column: "JP_Sales", label: "JP Sales (millions)", kind: FieldKind::Numeric },
    FormField { name: "other_sales", column: "Other_Sales", label: "Other Sales (millions)", kind: FieldKind::Numeric },
];

/// Submitted form values keyed by field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields {
    values: HashMap<String, String>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set a field
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Build the raw record, failing on the first missing or non-numeric field
    pub fn to_record(&self) -> Result<RawRecord> {
        let mut record = RawRecord::new();
        for field in &FORM_FIELDS {
            let raw = self
                .get(field.name)
                .ok_or_else(|| SalesError::MissingField(field.name.to_string()))?;
            let value = match field.kind {
                FieldKind::Categorical => RawValue::Text(raw.to_string()),
                FieldKind::Numeric => RawValue::Number(parse_number(field.name, raw)?),
            };
            record.insert(field.column, value);
        }
        Ok(record)
    }
}

impl From<HashMap<String, String>> for FormFields {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn parse_number(field: &str, raw: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| SalesError::InvalidNumber {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> FormFields {
        FormFields::from_iter([
            ("platform", "PS4"),
            ("genre", "Action"),
            ("publisher", "EA"),
            ("year", "2015"),
            ("na_sales", "1.2"),
            ("eu_sales", " 0.8 "),
            ("jp_sales", "0.1"),
            ("other_sales", "0.3"),
        ])
    }

    #[test]
    fn test_complete_form_to_record() {
        let record = complete_form().to_record().unwrap();

        assert_eq!(record.len(), 8);
        assert_eq!(record.get("Platform"), Some(&RawValue::Text("PS4".to_string())));
        assert_eq!(record.get("Year"), Some(&RawValue::Number(2015.0)));
        assert_eq!(record.get("EU_Sales"), Some(&RawValue::Number(0.8)));
    }

    #[test]
    fn test_missing_field() {
        let mut form = complete_form();
        form.values.remove("jp_sales");

        let err = form.to_record().unwrap_err();
        assert!(matches!(err, SalesError::MissingField(ref name) if name == "jp_sales"));
    }

    #[test]
    fn test_non_numeric_year() {
        let form = complete_form().with("year", "not-a-number");

        let err = form.to_record().unwrap_err();
        assert!(matches!(err, SalesError::InvalidNumber { ref field, .. } if field == "year"));
    }

    #[test]
    fn test_first_failing_field_is_reported() {
        let form = complete_form().with("year", "x").with("na_sales", "y");
        let err = form.to_record().unwrap_err();
        assert!(err.to_string().contains("year"));
    }

    #[test]
    fn test_categorical_fields_are_not_parsed() {
        let form = complete_form().with("platform", "2600");
        let record = form.to_record().unwrap();
        assert_eq!(record.get("Platform"), Some(&RawValue::Text("2600".to_string())));
    }
}

//! Fitted label encoders for categorical columns

use crate::error::Result;
use crate::utils::read_json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::RawValue;

/// A category label as stored in the encoder artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassLabel {
    Text(String),
    Number(f64),
}

/// On-disk shape of one encoder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoderRepr {
    pub classes: Vec<ClassLabel>,
}

/// Label encoder: each known label maps to its index in `classes`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LabelEncoderRepr", into = "LabelEncoderRepr")]
pub struct LabelEncoder {
    classes: Vec<ClassLabel>,
    text_codes: HashMap<String, usize>,
    numeric_codes: Vec<(f64, usize)>,
}

impl TryFrom<LabelEncoderRepr> for LabelEncoder {
    type Error = String;

    fn try_from(repr: LabelEncoderRepr) -> std::result::Result<Self, Self::Error> {
        LabelEncoder::new(repr.classes)
    }
}

impl From<LabelEncoder> for LabelEncoderRepr {
    fn from(encoder: LabelEncoder) -> Self {
        Self { classes: encoder.classes }
    }
}

impl LabelEncoder {
    /// Build an encoder from its ordered class list; labels must be unique
    pub fn new(classes: Vec<ClassLabel>) -> std::result::Result<Self, String> {
        let mut text_codes = HashMap::new();
        let mut numeric_codes: Vec<(f64, usize)> = Vec::new();

        for (code, label) in classes.iter().enumerate() {
            match label {
                ClassLabel::Text(text) => {
                    if text_codes.insert(text.clone(), code).is_some() {
                        return Err(format!("duplicate class label '{}'", text));
                    }
                }
                ClassLabel::Number(n) => {
                    if numeric_codes.iter().any(|(known, _)| known == n) {
                        return Err(format!("duplicate class label {}", n));
                    }
                    numeric_codes.push((*n, code));
                }
            }
        }

        Ok(Self { classes, text_codes, numeric_codes })
    }

    /// Convenience constructor for text-only class lists
    pub fn from_labels<I, S>(labels: I) -> std::result::Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(labels.into_iter().map(|l| ClassLabel::Text(l.into())).collect())
    }

    /// Code of a known text label, `None` when the label is unseen
    pub fn code(&self, label: &str) -> Option<usize> {
        self.text_codes.get(label).copied()
    }

    /// Code of a raw record value, matching text against text labels and
    /// numbers against numeric labels
    pub fn code_for(&self, value: &RawValue) -> Option<usize> {
        match value {
            RawValue::Text(text) => self.code(text),
            RawValue::Number(n) => self
                .numeric_codes
                .iter()
                .find(|(known, _)| known == n)
                .map(|(_, code)| *code),
        }
    }

    /// Known labels in code order
    pub fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Column name -> fitted encoder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncoderTable {
    encoders: HashMap<String, LabelEncoder>,
}

impl EncoderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the table from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path)
    }

    /// Builder method to register an encoder for a column
    pub fn with_encoder(mut self, column: impl Into<String>, encoder: LabelEncoder) -> Self {
        self.encoders.insert(column.into(), encoder);
        self
    }

    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

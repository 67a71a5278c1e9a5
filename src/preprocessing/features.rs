//! Record-to-vector feature encoding

use crate::error::{Result, SalesError};
use crate::utils::read_json;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use tracing::warn;

use super::EncoderTable;

/// One raw field value from a request
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(text) => write!(f, "{}", text),
            RawValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Column name -> raw value, built per request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    values: HashMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: RawValue) {
        self.values.insert(column.into(), value);
    }

    /// Builder method to add a text column
    pub fn with_text(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, RawValue::Text(value.into()));
        self
    }

    /// Builder method to add a numeric column
    pub fn with_number(mut self, column: impl Into<String>, value: f64) -> Self {
        self.insert(column, RawValue::Number(value));
        self
    }

    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.values.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered column names the predictor was trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureOrder {
    names: Vec<String>,
}

impl TryFrom<Vec<String>> for FeatureOrder {
    type Error = String;

    fn try_from(names: Vec<String>) -> std::result::Result<Self, Self::Error> {
        if names.is_empty() {
            return Err("feature order is empty".to_string());
        }
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(format!("feature '{}' appears more than once", name));
            }
        }
        Ok(Self { names })
    }
}

impl From<FeatureOrder> for Vec<String> {
    fn from(order: FeatureOrder) -> Self {
        order.names
    }
}

impl FeatureOrder {
    /// Build from names; fails on an empty or duplicated list
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Self::try_from(names).map_err(SalesError::Encoding)
    }

    /// Load the order from a JSON array file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        read_json(path)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Numeric model input aligned to a [`FeatureOrder`]
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Single-row matrix for the predictor
    pub fn to_row_matrix(&self) -> Result<Array2<f64>> {
        Ok(Array2::from_shape_vec((1, self.values.len()), self.values.clone())?)
    }
}

#[derive(Debug)]
enum Cell<'a> {
    Numeric(f64),
    Text(&'a str),
}

/// Encodes raw records against fitted encoders and the trained feature order
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder<'a> {
    encoders: &'a EncoderTable,
    order: &'a FeatureOrder,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(encoders: &'a EncoderTable, order: &'a FeatureOrder) -> Self {
        Self { encoders, order }
    }

    /// Build the feature vector for one record.
    ///
    /// Encoded columns take their label code; unseen labels become 0 and are
    /// logged. Features missing from the record are filled with 0. Columns
    /// outside the feature order are dropped.
    pub fn encode(&self, record: &RawRecord) -> Result<FeatureVector> {
        let mut row: HashMap<&str, Cell<'_>> = HashMap::with_capacity(record.len());

        for (column, value) in record.iter() {
            let cell = match (self.encoders.get(column), value) {
                (Some(encoder), _) => {
                    let code = encoder.code_for(value).unwrap_or_else(|| {
                        warn!(column = %column, value = %value, "Unseen label, encoding as 0");
                        0
                    });
                    Cell::Numeric(code as f64)
                }
                (None, RawValue::Number(n)) => Cell::Numeric(*n),
                (None, RawValue::Text(text)) => Cell::Text(text),
            };
            row.insert(column, cell);
        }

        let values = self
            .order
            .names()
            .iter()
            .map(|name| match row.get(name.as_str()) {
                None => Ok(0.0),
                Some(Cell::Numeric(v)) => Ok(*v),
                Some(Cell::Text(text)) => Err(SalesError::Encoding(format!(
                    "column '{}' has text value '{}' but no encoder",
                    name, text
                ))),
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(FeatureVector { values })
    }
}

/// Encode `record` against `encoders`, laid out by `order`
pub fn encode(record: &RawRecord, encoders: &EncoderTable, order: &FeatureOrder) -> Result<FeatureVector> {
    FeatureEncoder::new(encoders, order).encode(record)
}

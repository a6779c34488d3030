//! Request body validation
//!
//! Create bodies must carry every required field; both create and update
//! bodies run the per-field validators on the fields they contain.

pub mod validators;

use crate::core::store::Row;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A boxed field validator
pub type Validator = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// One failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Validation rules for one entity
#[derive(Clone, Default)]
pub struct EntityValidationConfig {
    required: Vec<String>,
    validators: Vec<(String, Validator)>,
}

impl fmt::Debug for EntityValidationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityValidationConfig")
            .field("required", &self.required)
            .field(
                "validators",
                &self.validators.iter().map(|(f, _)| f).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl EntityValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark fields as mandatory on create
    pub fn require<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn add_validator<F>(mut self, field: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push((field.into(), Arc::new(validator)));
        self
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    /// Validate a create body
    pub fn validate_create(&self, body: &Row) -> Result<(), Vec<FieldViolation>> {
        let mut violations: Vec<FieldViolation> = self
            .required
            .iter()
            .filter(|field| body.get(field.as_str()).is_none_or(Value::is_null))
            .map(|field| FieldViolation {
                field: field.clone(),
                message: format!("'{}' is required", field),
            })
            .collect();

        violations.extend(self.run_validators(body));
        finish(violations)
    }

    /// Validate a partial update body (only the fields present are checked)
    pub fn validate_update(&self, body: &Row) -> Result<(), Vec<FieldViolation>> {
        finish(self.run_validators(body))
    }

    fn run_validators(&self, body: &Row) -> Vec<FieldViolation> {
        self.validators
            .iter()
            .filter_map(|(field, validator)| {
                let value = body.get(field)?;
                validator(field, value).err().map(|message| FieldViolation {
                    field: field.clone(),
                    message,
                })
            })
            .collect()
    }
}

fn finish(violations: Vec<FieldViolation>) -> Result<(), Vec<FieldViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

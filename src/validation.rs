//! Pure request-body validators.
//!
//! Each endpoint declares a typed DTO and builds it from the raw JSON
//! body through these helpers. The first failing field aborts with a
//! message naming the field and the violated rule.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ApiError;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

/// The parsed JSON body of a request, with typed field accessors
pub struct Fields(Map<String, Value>);

impl Fields {
    /// Accept only a JSON object body. Missing bodies and non-object
    /// payloads are validation failures, not transport errors.
    pub fn from_body(body: Option<Value>) -> Result<Self, ApiError> {
        match body {
            Some(Value::Object(map)) => Ok(Self(map)),
            _ => Err(ApiError::validation("Request body must be a JSON object")),
        }
    }

    /// Reject any field outside the allow-list
    pub fn deny_unknown(&self, allowed: &[&str]) -> Result<(), ApiError> {
        for key in self.0.keys() {
            if !allowed.contains(&key.as_str()) {
                return Err(ApiError::validation(format!("\"{key}\" is not allowed")));
            }
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Option<&Value> {
        match self.0.get(name) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    pub fn required_string(&self, name: &str) -> Result<String, ApiError> {
        match self.optional_string(name)? {
            Some(value) => Ok(value),
            None => Err(ApiError::validation(format!("\"{name}\" is required"))),
        }
    }

    pub fn optional_string(&self, name: &str) -> Result<Option<String>, ApiError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ApiError::validation(format!("\"{name}\" must be a string"))),
        }
    }

    pub fn required_number(&self, name: &str) -> Result<f64, ApiError> {
        match self.optional_number(name)? {
            Some(value) => Ok(value),
            None => Err(ApiError::validation(format!("\"{name}\" is required"))),
        }
    }

    pub fn optional_number(&self, name: &str) -> Result<Option<f64>, ApiError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) if f.is_finite() => Ok(Some(f)),
                _ => Err(ApiError::validation(format!("\"{name}\" must be a number"))),
            },
            Some(_) => Err(ApiError::validation(format!("\"{name}\" must be a number"))),
        }
    }

    pub fn required_integer(&self, name: &str) -> Result<i64, ApiError> {
        match self.optional_integer(name)? {
            Some(value) => Ok(value),
            None => Err(ApiError::validation(format!("\"{name}\" is required"))),
        }
    }

    pub fn optional_integer(&self, name: &str) -> Result<Option<i64>, ApiError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => Ok(Some(i)),
                None if n.as_f64().is_some() => {
                    Err(ApiError::validation(format!("\"{name}\" must be an integer")))
                }
                None => Err(ApiError::validation(format!("\"{name}\" must be a number"))),
            },
            Some(_) => Err(ApiError::validation(format!("\"{name}\" must be a number"))),
        }
    }

    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>, ApiError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(ApiError::validation(format!("\"{name}\" must be a boolean"))),
        }
    }
}

pub fn email(name: &str, value: &str) -> Result<(), ApiError> {
    if EMAIL_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(ApiError::validation(format!("\"{name}\" must be a valid email")))
    }
}

pub fn min_len(name: &str, value: &str, min: usize) -> Result<(), ApiError> {
    if value.chars().count() < min {
        Err(ApiError::validation(format!(
            "\"{name}\" length must be at least {min} characters long"
        )))
    } else {
        Ok(())
    }
}

pub fn max_len(name: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        Err(ApiError::validation(format!(
            "\"{name}\" length must be less than or equal to {max} characters long"
        )))
    } else {
        Ok(())
    }
}

pub fn one_of(name: &str, value: &str, allowed: &[&str]) -> Result<(), ApiError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "\"{name}\" must be one of [{}]",
            allowed.join(", ")
        )))
    }
}

pub fn positive(name: &str, value: f64) -> Result<(), ApiError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ApiError::validation(format!("\"{name}\" must be a positive number")))
    }
}

// Composite rules shared by several endpoints

pub fn required_email(fields: &Fields, name: &str) -> Result<String, ApiError> {
    let value = fields.required_string(name)?;
    email(name, &value)?;
    Ok(value)
}

pub fn optional_email(fields: &Fields, name: &str) -> Result<Option<String>, ApiError> {
    match fields.optional_string(name)? {
        Some(value) => {
            email(name, &value)?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

pub fn required_password(fields: &Fields, name: &str) -> Result<String, ApiError> {
    let value = fields.required_string(name)?;
    min_len(name, &value, 8)?;
    max_len(name, &value, 255)?;
    Ok(value)
}

pub fn optional_password(fields: &Fields, name: &str) -> Result<Option<String>, ApiError> {
    match fields.optional_string(name)? {
        Some(value) => {
            min_len(name, &value, 8)?;
            max_len(name, &value, 255)?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

pub fn required_name(fields: &Fields, name: &str) -> Result<String, ApiError> {
    let value = fields.required_string(name)?;
    max_len(name, &value, 255)?;
    Ok(value)
}

pub fn optional_name(fields: &Fields, name: &str) -> Result<Option<String>, ApiError> {
    match fields.optional_string(name)? {
        Some(value) => {
            max_len(name, &value, 255)?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        Fields::from_body(Some(value)).unwrap()
    }

    #[test]
    fn missing_required_field_names_it() {
        let f = fields(json!({ "email": "a@x.com" }));
        let err = required_password(&f, "password").unwrap_err();
        assert_eq!(err.message(), "\"password\" is required");
    }

    #[test]
    fn short_password_reports_length_rule() {
        let f = fields(json!({ "password": "short" }));
        let err = required_password(&f, "password").unwrap_err();
        assert_eq!(err.message(), "\"password\" length must be at least 8 characters long");
    }

    #[test]
    fn email_format_is_checked() {
        let f = fields(json!({ "email": "not-an-email" }));
        let err = required_email(&f, "email").unwrap_err();
        assert_eq!(err.message(), "\"email\" must be a valid email");

        let f = fields(json!({ "email": "a@x.com" }));
        assert_eq!(required_email(&f, "email").unwrap(), "a@x.com");
    }

    #[test]
    fn one_of_lists_allowed_values() {
        let err = one_of("role", "admin", &["realtor", "client"]).unwrap_err();
        assert_eq!(err.message(), "\"role\" must be one of [realtor, client]");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let f = fields(json!({ "name": "A", "realtor": "x" }));
        let err = f.deny_unknown(&["name"]).unwrap_err();
        assert_eq!(err.message(), "\"realtor\" is not allowed");
    }

    #[test]
    fn integers_reject_fractions() {
        let f = fields(json!({ "numberOfRooms": 2.5 }));
        let err = f.required_integer("numberOfRooms").unwrap_err();
        assert_eq!(err.message(), "\"numberOfRooms\" must be an integer");
    }

    #[test]
    fn null_counts_as_absent() {
        let f = fields(json!({ "description": null }));
        assert_eq!(f.optional_string("description").unwrap(), None);
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        assert!(Fields::from_body(None).is_err());
        assert!(Fields::from_body(Some(json!([1, 2]))).is_err());
    }
}

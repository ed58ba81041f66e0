//! Payload validation for book create/replace requests.
//!
//! Validation runs before any storage access and collects every failure
//! into one list of messages rather than stopping at the first. Semantics:
//! all required fields present, no undeclared fields, exact JSON types,
//! no coercion, no defaults, null is not a value.

use serde_json::Value;

use super::models::{BookDraft, NewBook};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Integer,
    PositiveInteger,
}

struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
}

const CREATE_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "isbn", kind: FieldKind::Text },
    FieldSpec { name: "amazon_url", kind: FieldKind::Text },
    FieldSpec { name: "author", kind: FieldKind::Text },
    FieldSpec { name: "language", kind: FieldKind::Text },
    FieldSpec { name: "pages", kind: FieldKind::PositiveInteger },
    FieldSpec { name: "publisher", kind: FieldKind::Text },
    FieldSpec { name: "title", kind: FieldKind::Text },
    FieldSpec { name: "year", kind: FieldKind::Integer },
];

// Replace payloads take the isbn from the URL path, so it is undeclared here.
const REPLACE_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "amazon_url", kind: FieldKind::Text },
    FieldSpec { name: "author", kind: FieldKind::Text },
    FieldSpec { name: "language", kind: FieldKind::Text },
    FieldSpec { name: "pages", kind: FieldKind::PositiveInteger },
    FieldSpec { name: "publisher", kind: FieldKind::Text },
    FieldSpec { name: "title", kind: FieldKind::Text },
    FieldSpec { name: "year", kind: FieldKind::Integer },
];

/// Validate a create payload, returning the typed book or all failures.
pub fn validate_create(payload: &Value) -> Result<NewBook, Vec<String>> {
    validate_object(payload, CREATE_FIELDS)?;
    serde_json::from_value(payload.clone())
        .map_err(|error| vec![format!("malformed payload: {error}")])
}

/// Validate a replace payload, returning the typed draft or all failures.
pub fn validate_replace(payload: &Value) -> Result<BookDraft, Vec<String>> {
    validate_object(payload, REPLACE_FIELDS)?;
    serde_json::from_value(payload.clone())
        .map_err(|error| vec![format!("malformed payload: {error}")])
}

fn validate_object(payload: &Value, fields: &[FieldSpec]) -> Result<(), Vec<String>> {
    let Some(obj) = payload.as_object() else {
        return Err(vec![format!(
            "request body must be a JSON object, got {}",
            json_type_name(payload)
        )]);
    };

    let mut errors = Vec::new();

    // No undeclared fields allowed
    for key in obj.keys() {
        if !fields.iter().any(|field| field.name == key) {
            errors.push(format!("undeclared field: {key}"));
        }
    }

    for field in fields {
        match obj.get(field.name) {
            None => errors.push(format!("missing required field: {}", field.name)),
            Some(value) => {
                if let Some(message) = check_type(field, value) {
                    errors.push(message);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_type(field: &FieldSpec, value: &Value) -> Option<String> {
    match field.kind {
        FieldKind::Text => {
            if value.is_string() {
                None
            } else {
                Some(format!(
                    "{} must be a string, got {}",
                    field.name,
                    json_type_name(value)
                ))
            }
        }
        FieldKind::Integer => match value.as_i64() {
            Some(_) => None,
            None => Some(format!(
                "{} must be an integer, got {}",
                field.name,
                json_type_name(value)
            )),
        },
        FieldKind::PositiveInteger => match value.as_i64() {
            Some(n) if n >= 1 => None,
            Some(_) => Some(format!("{} must be a positive integer", field.name)),
            None => Some(format!(
                "{} must be a positive integer, got {}",
                field.name,
                json_type_name(value)
            )),
        },
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_payload() -> Value {
        json!({
            "isbn": "98675634",
            "amazon_url": "https://amazon-testing.com",
            "author": "Kennedy Brown",
            "language": "english",
            "pages": 300,
            "publisher": "Princeton publisher",
            "title": "Eat a little less, exercise a little more",
            "year": 2020
        })
    }

    fn replace_payload() -> Value {
        json!({
            "amazon_url": "https://taco.com",
            "author": "Tester",
            "language": "english",
            "pages": 500,
            "publisher": "top publisher",
            "title": "Never give up",
            "year": 2000
        })
    }

    #[test]
    fn valid_create_payload_passes() {
        let book = validate_create(&create_payload()).unwrap();
        assert_eq!(book.isbn, "98675634");
        assert_eq!(book.pages, 300);
    }

    #[test]
    fn missing_required_field_fails() {
        let mut payload = create_payload();
        payload.as_object_mut().unwrap().remove("author");

        let errors = validate_create(&payload).unwrap_err();
        assert_eq!(errors, vec!["missing required field: author".to_string()]);
    }

    #[test]
    fn every_failure_is_collected() {
        let mut payload = create_payload();
        {
            let obj = payload.as_object_mut().unwrap();
            obj.remove("author");
            obj.remove("title");
            obj.insert("pages".to_string(), json!("many"));
        }

        let errors = validate_create(&payload).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&"missing required field: author".to_string()));
        assert!(errors.contains(&"missing required field: title".to_string()));
        assert!(errors.contains(&"pages must be a positive integer, got string".to_string()));
    }

    #[test]
    fn undeclared_field_fails() {
        let mut payload = replace_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("badField".to_string(), json!("DO NOT ADD ME!"));

        let errors = validate_replace(&payload).unwrap_err();
        assert_eq!(errors, vec!["undeclared field: badField".to_string()]);
    }

    #[test]
    fn replace_rejects_isbn_in_body() {
        let mut payload = replace_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("isbn".to_string(), json!("32794782"));

        let errors = validate_replace(&payload).unwrap_err();
        assert_eq!(errors, vec!["undeclared field: isbn".to_string()]);
    }

    #[test]
    fn type_mismatch_fails() {
        let mut payload = create_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("author".to_string(), json!(42));

        let errors = validate_create(&payload).unwrap_err();
        assert_eq!(errors, vec!["author must be a string, got number".to_string()]);
    }

    #[test]
    fn year_must_be_an_integer() {
        let mut payload = create_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("year".to_string(), json!(2020.5));

        let errors = validate_create(&payload).unwrap_err();
        assert_eq!(errors, vec!["year must be an integer, got number".to_string()]);
    }

    #[test]
    fn year_has_no_enforced_bounds() {
        let mut payload = create_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("year".to_string(), json!(-850));

        assert!(validate_create(&payload).is_ok());
    }

    #[test]
    fn pages_must_be_positive() {
        let mut payload = create_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("pages".to_string(), json!(0));

        let errors = validate_create(&payload).unwrap_err();
        assert_eq!(errors, vec!["pages must be a positive integer".to_string()]);
    }

    #[test]
    fn null_is_not_a_value() {
        let mut payload = create_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("publisher".to_string(), json!(null));

        let errors = validate_create(&payload).unwrap_err();
        assert_eq!(errors, vec!["publisher must be a string, got null".to_string()]);
    }

    #[test]
    fn non_object_payload_fails() {
        let errors = validate_create(&json!(["not", "an", "object"])).unwrap_err();
        assert_eq!(
            errors,
            vec!["request body must be a JSON object, got array".to_string()]
        );
    }
}

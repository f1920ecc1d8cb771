//! Validator adapter.
//!
//! Every validation step in the kernel produces a [`Validation`] value: the
//! parsed value on success, or a non-empty list of human-readable problems on
//! failure. Validation never panics and never returns a [`KernelError`]; a
//! handler decides whether an invalid input is fatal.
//!
//! Field-level checking is delegated to a [`Schema`]. Anything that can turn
//! a JSON value into `Validation<T>` can be plugged in, so the kernel does not
//! depend on any particular schema library.
//!
//! [`KernelError`]: crate::KernelError

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Outcome of a validation step.
pub type Validation<T> = Result<T, Vec<String>>;

/// String-keyed map used for query, header, and path parameter values.
pub type StringMap = BTreeMap<String, String>;

/// Fallback message used when a schema fails without saying why.
const UNSPECIFIED_FAILURE: &str = "validation failed";

/// A capability that checks and converts untyped input.
pub trait Schema: Send + Sync {
    /// The typed value produced on success.
    type Output;

    /// Validates `input`, returning the typed value or the list of problems.
    fn validate(&self, input: &Value) -> Validation<Self::Output>;
}

/// Runs `schema` against `input`.
///
/// Guarantees that a failure carries at least one message even if the schema
/// reported an empty error list.
pub fn validate<S>(schema: &S, input: &Value) -> Validation<S::Output>
where
    S: Schema + ?Sized,
{
    schema.validate(input).map_err(|errors| {
        if errors.is_empty() {
            vec![UNSPECIFIED_FAILURE.to_string()]
        } else {
            errors
        }
    })
}

/// Schema backed by a type's `serde::Deserialize` implementation.
///
/// Deserialization stops at the first problem, so a failure carries exactly
/// one message, prefixed with the JSON path of the offending value
/// (`items[0].qty: invalid type: ...`). Schemas that must report every field
/// problem at once implement [`Schema`] directly, as [`StringMapSchema`] does.
///
/// # Example
///
/// ```
/// use hypatia_core::{validate, JsonSchema};
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Debug, Deserialize)]
/// struct NewProduct {
///     name: String,
///     price: f64,
/// }
///
/// let schema = JsonSchema::<NewProduct>::new();
/// let ok = validate(&schema, &json!({"name": "Lamp", "price": 12.5})).unwrap();
/// assert_eq!(ok.name, "Lamp");
///
/// let errors = validate(&schema, &json!({"name": "Lamp"})).unwrap_err();
/// assert!(errors[0].contains("price"));
/// ```
pub struct JsonSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSchema<T> {
    /// Creates a schema for `T`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for JsonSchema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchema")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: DeserializeOwned> Schema for JsonSchema<T> {
    type Output = T;

    fn validate(&self, input: &Value) -> Validation<T> {
        serde_path_to_error::deserialize(input).map_err(|e| vec![path_error_message(&e)])
    }
}

fn path_error_message(error: &serde_path_to_error::Error<serde_json::Error>) -> String {
    let path = error.path().to_string();
    if path == "." {
        error.inner().to_string()
    } else {
        format!("{path}: {}", error.inner())
    }
}

/// Schema accepting a flat JSON object whose values are all strings.
///
/// Used for query strings and headers, which carry no richer structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringMapSchema;

impl Schema for StringMapSchema {
    type Output = StringMap;

    fn validate(&self, input: &Value) -> Validation<StringMap> {
        let Value::Object(object) = input else {
            return Err(vec![format!(
                "expected an object of strings, found {}",
                json_kind(input)
            )]);
        };

        let mut map = StringMap::new();
        let mut errors = Vec::new();
        for (key, value) in object {
            match value {
                Value::String(s) => {
                    map.insert(key.clone(), s.clone());
                }
                other => errors.push(format!("{key}: expected string, found {}", json_kind(other))),
            }
        }

        if errors.is_empty() {
            Ok(map)
        } else {
            Err(errors)
        }
    }
}

/// Schema built from a closure.
///
/// # Example
///
/// ```
/// use hypatia_core::{validate, FnSchema};
/// use serde_json::{json, Value};
///
/// let positive = FnSchema::new(|input: &Value| match input.as_i64() {
///     Some(n) if n > 0 => Ok(n),
///     _ => Err(vec!["expected a positive integer".to_string()]),
/// });
///
/// assert_eq!(validate(&positive, &json!(3)), Ok(3));
/// assert!(validate(&positive, &json!(-1)).is_err());
/// ```
pub struct FnSchema<F> {
    func: F,
}

impl<F> FnSchema<F> {
    /// Wraps `func` as a schema.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, T> Schema for FnSchema<F>
where
    F: Fn(&Value) -> Validation<T> + Send + Sync,
{
    type Output = T;

    fn validate(&self, input: &Value) -> Validation<T> {
        (self.func)(input)
    }
}

/// Converts a string map into a JSON object.
#[must_use]
pub fn string_map_to_value(map: &StringMap) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

const fn json_kind(value: &Value) -> &'static str {
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
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Transition {
        event: String,
    }

    #[test]
    fn test_json_schema_success() {
        let schema = JsonSchema::<Transition>::new();
        let result = validate(&schema, &json!({"event": "Submit"}));
        assert_eq!(
            result,
            Ok(Transition {
                event: "Submit".to_string()
            })
        );
    }

    #[test]
    fn test_json_schema_type_mismatch() {
        let schema = JsonSchema::<Transition>::new();
        let errors = validate(&schema, &json!({"event": 7})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("invalid type"));
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct LineItem {
        qty: u32,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Order {
        name: String,
        items: Vec<LineItem>,
    }

    #[test]
    fn test_json_schema_error_carries_nested_path() {
        let schema = JsonSchema::<Order>::new();
        let errors =
            validate(&schema, &json!({"name": "Lamp", "items": [{"qty": 1}, {"qty": "x"}]}))
                .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("items[1].qty: invalid type"), "{}", errors[0]);
    }

    #[test]
    fn test_json_schema_reports_first_bad_field_with_path() {
        let schema = JsonSchema::<Order>::new();
        let errors = validate(&schema, &json!({"name": 5, "items": [{"qty": "x"}]})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(
            errors[0].starts_with("name: ") || errors[0].starts_with("items[0].qty: "),
            "{}",
            errors[0]
        );
    }

    #[test]
    fn test_json_schema_missing_field_has_no_path_prefix() {
        let schema = JsonSchema::<Transition>::new();
        let errors = validate(&schema, &json!({})).unwrap_err();
        assert_eq!(errors, vec!["missing field `event`".to_string()]);
    }

    #[test]
    fn test_string_map_schema_accepts_strings() {
        let map = validate(&StringMapSchema, &json!({"page": "2", "q": "lamp"})).unwrap();
        assert_eq!(map.get("page").map(String::as_str), Some("2"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_string_map_schema_reports_each_bad_field() {
        let errors = validate(&StringMapSchema, &json!({"a": 1, "b": true, "c": "ok"})).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.starts_with("a:")));
        assert!(errors.iter().any(|e| e.starts_with("b:")));
    }

    #[test]
    fn test_string_map_schema_rejects_non_object() {
        let errors = validate(&StringMapSchema, &json!(["a"])).unwrap_err();
        assert_eq!(errors, vec!["expected an object of strings, found array".to_string()]);
    }

    #[test]
    fn test_empty_error_list_is_filled_in() {
        let schema = FnSchema::new(|_: &Value| -> Validation<()> { Err(Vec::new()) });
        let errors = validate(&schema, &Value::Null).unwrap_err();
        assert_eq!(errors, vec![UNSPECIFIED_FAILURE.to_string()]);
    }

    #[test]
    fn test_string_map_to_value() {
        let mut map = StringMap::new();
        map.insert("id".to_string(), "42".to_string());
        assert_eq!(string_map_to_value(&map), json!({"id": "42"}));
    }
}

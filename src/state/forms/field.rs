//! Form field value objects

use serde_json::Value;

/// Type-safe field values
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Option<i64>),
    Toggle(bool),
    /// Keys of related records, used by relationship-bound fields
    Keys(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(Some(n)) => Value::from(*n),
            FieldValue::Number(None) => Value::Null,
            FieldValue::Toggle(b) => Value::Bool(*b),
            FieldValue::Keys(keys) => Value::from(keys.clone()),
        }
    }

    /// Convert raw state into a value of the same kind as `self`.
    /// Values that don't fit the kind fall back to the kind's empty value.
    pub fn coerce(&self, raw: &Value) -> FieldValue {
        match self {
            FieldValue::Text(_) => FieldValue::Text(match raw {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            }),
            FieldValue::Number(_) => FieldValue::Number(match raw {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }),
            FieldValue::Toggle(_) => FieldValue::Toggle(raw.as_bool().unwrap_or(false)),
            FieldValue::Keys(_) => FieldValue::Keys(match raw {
                Value::Array(items) => items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                Value::String(s) if !s.is_empty() => vec![s.clone()],
                _ => Vec::new(),
            }),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(n) => n.is_none(),
            FieldValue::Toggle(_) => false,
            FieldValue::Keys(keys) => keys.is_empty(),
        }
    }
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub value: FieldValue,
    /// Value restored by `fill()`
    pub default: FieldValue,
    pub is_multiline: bool,
    pub required: bool,
    /// Name of the relationship this field is saved through, if any
    pub relationship: Option<String>,
}

impl FormField {
    fn with_default(name: &str, label: &str, default: FieldValue) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            value: default.clone(),
            default,
            is_multiline: false,
            required: false,
            relationship: None,
        }
    }

    /// Create a new text field
    pub fn text(name: &str, label: &str, is_multiline: bool) -> Self {
        Self {
            is_multiline,
            ..Self::with_default(name, label, FieldValue::Text(String::new()))
        }
    }

    /// Create a new numeric field
    pub fn number(name: &str, label: &str) -> Self {
        Self::with_default(name, label, FieldValue::Number(None))
    }

    /// Create a new on/off field
    pub fn toggle(name: &str, label: &str) -> Self {
        Self::with_default(name, label, FieldValue::Toggle(false))
    }

    /// Create a field holding related record keys, saved through `relationship`
    pub fn related_keys(name: &str, label: &str, relationship: &str) -> Self {
        Self {
            relationship: Some(relationship.to_string()),
            ..Self::with_default(name, label, FieldValue::Keys(Vec::new()))
        }
    }

    /// Set the value restored when the form is filled
    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.value = value.clone();
        self.default = value;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Reset to the default value
    pub fn reset(&mut self) {
        self.value = self.default.clone();
    }

    pub fn set_raw(&mut self, raw: &Value) {
        self.value = self.value.coerce(raw);
    }

    /// Get the text value (returns empty string for non-text fields)
    pub fn as_text(&self) -> &str {
        match &self.value {
            FieldValue::Text(s) => s,
            _ => "",
        }
    }

    /// Push a character to the field value
    pub fn push_char(&mut self, c: char) {
        match &mut self.value {
            FieldValue::Text(s) => s.push(c),
            FieldValue::Number(n) => {
                if let Some(d) = c.to_digit(10) {
                    let current = n.unwrap_or(0);
                    *n = Some(current.saturating_mul(10).saturating_add(i64::from(d)));
                }
            }
            FieldValue::Toggle(b) => {
                if c == ' ' {
                    *b = !*b;
                }
            }
            FieldValue::Keys(keys) => {
                if c == ',' {
                    keys.push(String::new());
                } else if let Some(last) = keys.last_mut() {
                    last.push(c);
                } else {
                    keys.push(c.to_string());
                }
            }
        }
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        match &mut self.value {
            FieldValue::Text(s) => {
                s.pop();
            }
            FieldValue::Number(n) => {
                *n = n.and_then(|v| if v / 10 == 0 { None } else { Some(v / 10) });
            }
            FieldValue::Toggle(_) => {}
            FieldValue::Keys(keys) => {
                if let Some(last) = keys.last_mut() {
                    if last.pop().is_none() {
                        keys.pop();
                    }
                }
            }
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match &self.value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(Some(n)) => n.to_string(),
            FieldValue::Number(None) => String::new(),
            FieldValue::Toggle(true) => "[x]".to_string(),
            FieldValue::Toggle(false) => "[ ]".to_string(),
            FieldValue::Keys(keys) => keys.join(","),
        }
    }
}

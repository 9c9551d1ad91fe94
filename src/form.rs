//! Form encoding for mutation requests
//!
//! Every message posted to the thermostat is flattened into URL-encoded
//! `name=value` pairs. Instead of inspecting types at runtime, each message
//! type publishes a table of [`FormField`]s through [`FormEncode`], and
//! [`encode`] turns that table into the wire pairs.

use crate::error::EncodeError;
use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;

/// Encoded form body, sorted by field name
pub type FormPairs = Vec<(String, String)>;

/// Runtime value of one form field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// A kind outside the supported families, carrying its type name
    Unsupported(&'static str),
}

impl FieldValue {
    /// Whether the value equals the zero value of its kind
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Str(s) => s.is_empty(),
            FieldValue::Int(i) => *i == 0,
            FieldValue::Uint(u) => *u == 0,
            FieldValue::Float(f) => *f == 0.0,
            FieldValue::Bool(b) => !b,
            FieldValue::Unsupported(_) => false,
        }
    }

    /// Wire text of the value, or the kind name if it cannot be formatted
    fn format(&self) -> std::result::Result<String, &'static str> {
        match self {
            FieldValue::Str(s) => Ok(s.clone()),
            FieldValue::Int(i) => Ok(i.to_string()),
            FieldValue::Uint(u) => Ok(u.to_string()),
            // Display for f64 is the shortest representation that round-trips
            FieldValue::Float(f) => Ok(f.to_string()),
            FieldValue::Bool(b) => Ok(b.to_string()),
            FieldValue::Unsupported(kind) => Err(*kind),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(f64::from(value))
    }
}

macro_rules! field_value_from_int {
    ($variant:ident as $wide:ty: $($t:ty),+) => {
        $(
            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    FieldValue::$variant(<$wide>::from(value))
                }
            }
        )+
    };
}

field_value_from_int!(Int as i64: i8, i16, i32, i64);
field_value_from_int!(Uint as u64: u8, u16, u32, u64);

impl From<isize> for FieldValue {
    fn from(value: isize) -> Self {
        FieldValue::Int(value as i64)
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        FieldValue::Uint(value as u64)
    }
}

/// One entry of a message type's field table
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    ident: &'static str,
    rename: Option<&'static str>,
    omit_empty: bool,
    value: FieldValue,
}

impl FormField {
    /// Field whose wire name is derived from its identifier
    pub fn new(ident: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            ident,
            rename: None,
            omit_empty: false,
            value: value.into(),
        }
    }

    /// Field whose kind the encoder cannot format
    pub fn unsupported(ident: &'static str, kind: &'static str) -> Self {
        Self::new(ident, FieldValue::Unsupported(kind))
    }

    /// Use an explicit wire name; `"-"` drops the field
    pub fn rename(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    /// Drop the field when it holds its zero value
    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// Drop the field unconditionally
    pub fn skip(self) -> Self {
        self.rename("-")
    }

    /// Name the field is posted under
    pub fn wire_name(&self) -> Cow<'static, str> {
        match self.rename {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(to_snake_case(self.ident)),
        }
    }

    fn is_skipped(&self) -> bool {
        self.rename == Some("-")
    }
}

/// Types that can be posted as a form body
pub trait FormEncode {
    /// The type's field table, in declaration order
    fn form_fields(&self) -> Result<Vec<FormField>, EncodeError>;
}

impl<T: FormEncode + ?Sized> FormEncode for &T {
    fn form_fields(&self) -> Result<Vec<FormField>, EncodeError> {
        (**self).form_fields()
    }
}

impl<T: FormEncode + ?Sized> FormEncode for Box<T> {
    fn form_fields(&self) -> Result<Vec<FormField>, EncodeError> {
        (**self).form_fields()
    }
}

impl<T: FormEncode + ?Sized> FormEncode for Rc<T> {
    fn form_fields(&self) -> Result<Vec<FormField>, EncodeError> {
        (**self).form_fields()
    }
}

impl<T: FormEncode + ?Sized> FormEncode for Arc<T> {
    fn form_fields(&self) -> Result<Vec<FormField>, EncodeError> {
        (**self).form_fields()
    }
}

impl<T: FormEncode> FormEncode for Option<T> {
    fn form_fields(&self) -> Result<Vec<FormField>, EncodeError> {
        self.as_ref().ok_or(EncodeError::NilInput)?.form_fields()
    }
}

/// Encode a message into form pairs sorted by wire name
pub fn encode<T: FormEncode + ?Sized>(value: &T) -> Result<FormPairs, EncodeError> {
    let mut pairs = Vec::new();

    for field in value.form_fields()? {
        if field.is_skipped() {
            continue;
        }

        let text = field
            .value
            .format()
            .map_err(|kind| EncodeError::UnsupportedField {
                field: field.ident,
                kind,
            })?;

        if field.omit_empty && field.value.is_zero() {
            continue;
        }

        pairs.push((field.wire_name().into_owned(), text));
    }

    // stable, so repeated names keep their table order
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(pairs)
}

/// Convert a camel-cased identifier to snake case
///
/// Each run of ASCII uppercase letters starts a new underscore-separated,
/// lowercased word: `HeatTemp` becomes `heat_temp`, `CO2PPM` becomes
/// `co2_ppm`. Identifiers without uppercase letters pass through unchanged.
pub fn to_snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    let mut in_run = false;

    for c in ident.chars() {
        if c.is_ascii_uppercase() {
            if !in_run {
                out.push('_');
                in_run = true;
            }
            out.push(c.to_ascii_lowercase());
        } else {
            in_run = false;
            out.push(c);
        }
    }

    match out.strip_prefix('_') {
        Some(trimmed) => trimmed.to_string(),
        None => out,
    }
}

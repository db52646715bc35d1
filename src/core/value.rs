//! Field values accepted by `with_field`
//!
//! `Value` is a closed sum type. The encoder checks the capability variants
//! (`Json`, `Text`, `Display`) before it looks at the structural kinds, which
//! keeps the resolution order fixed without any runtime type inspection.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Error type returned by the marshal capabilities
pub type MarshalError = Box<dyn StdError + Send + Sync>;

/// A value that knows how to render itself as JSON bytes.
///
/// The output is embedded as an escaped, quoted string; it is never re-parsed.
pub trait MarshalJson: Send + Sync {
    fn marshal_json(&self) -> Result<Vec<u8>, MarshalError>;
}

/// A value that knows how to render itself as text.
pub trait MarshalText: Send + Sync {
    fn marshal_text(&self) -> Result<Vec<u8>, MarshalError>;
}

/// Any `serde::Serialize` value, marshalled through `serde_json`.
pub struct SerdeJson<T>(pub T);

impl<T: Serialize + Send + Sync> MarshalJson for SerdeJson<T> {
    fn marshal_json(&self) -> Result<Vec<u8>, MarshalError> {
        serde_json::to_vec(&self.0).map_err(Into::into)
    }
}

/// One field of a [`Record`]. Hidden fields are carried but never encoded.
#[derive(Debug, Clone)]
pub struct RecordField {
    pub name: Cow<'static, str>,
    pub value: Value,
    pub exported: bool,
}

/// Struct-like value: named fields in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Vec<RecordField>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an externally visible field
    #[must_use]
    pub fn field(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.fields.push(RecordField {
            name: name.into(),
            value: value.into(),
            exported: true,
        });
        self
    }

    /// Add a field that is kept out of the encoded output
    #[must_use]
    pub fn hidden(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.fields.push(RecordField {
            name: name.into(),
            value: value.into(),
            exported: false,
        });
        self
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    /// Fields that appear in the encoded output
    pub fn exported(&self) -> impl Iterator<Item = &RecordField> {
        self.fields.iter().filter(|f| f.exported)
    }
}

#[derive(Clone)]
pub enum Value {
    /// Absent value, encoded as `""`
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    /// Real and imaginary parts
    Complex(f64, f64),
    Str(Cow<'static, str>),
    Seq(Vec<Value>),
    /// Key/value pairs in insertion order
    Map(Vec<(Value, Value)>),
    Record(Record),
    /// Pointer-like value; `None` encodes like `Nil`
    Optional(Option<Box<Value>>),
    Json(Arc<dyn MarshalJson>),
    Text(Arc<dyn MarshalText>),
    Display(Arc<dyn fmt::Display + Send + Sync>),
    Time(DateTime<Local>),
    /// Diagnostic address of a function, channel or raw pointer
    Address(usize),
}

impl Value {
    /// Wrap a serializable value so it is encoded through `serde_json`
    pub fn json<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        Value::Json(Arc::new(SerdeJson(value)))
    }

    pub fn text<T: MarshalText + 'static>(value: T) -> Self {
        Value::Text(Arc::new(value))
    }

    /// Encode a value by its `Display` output
    pub fn display<T: fmt::Display + Send + Sync + 'static>(value: T) -> Self {
        Value::Display(Arc::new(value))
    }

    pub fn complex(re: f64, im: f64) -> Self {
        Value::Complex(re, im)
    }

    /// Address of whatever `ptr` points at
    pub fn address<T: ?Sized>(ptr: *const T) -> Self {
        Value::Address(ptr as *const () as usize)
    }

    pub fn map<K, V, I>(pairs: I) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn is_nil(&self) -> bool {
        match self {
            Value::Nil | Value::Optional(None) => true,
            Value::Optional(Some(inner)) => inner.is_nil(),
            _ => false,
        }
    }

    /// Whether the encoded form of this value starts with a quote
    pub(crate) fn encodes_as_string(&self) -> bool {
        match self {
            Value::Optional(Some(inner)) => inner.encodes_as_string(),
            Value::Nil
            | Value::Optional(None)
            | Value::Complex(..)
            | Value::Str(_)
            | Value::Json(_)
            | Value::Text(_)
            | Value::Display(_)
            | Value::Time(_)
            | Value::Address(_) => true,
            Value::Float(f) => !f.is_finite(),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Uint(u) => f.debug_tuple("Uint").field(u).finish(),
            Value::Float(fl) => f.debug_tuple("Float").field(fl).finish(),
            Value::Complex(re, im) => f.debug_tuple("Complex").field(re).field(im).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
            Value::Map(pairs) => f.debug_tuple("Map").field(pairs).finish(),
            Value::Record(record) => f.debug_tuple("Record").field(record).finish(),
            Value::Optional(inner) => f.debug_tuple("Optional").field(inner).finish(),
            Value::Json(_) => f.write_str("Json(..)"),
            Value::Text(_) => f.write_str("Text(..)"),
            Value::Display(d) => write!(f, "Display({})", d),
            Value::Time(t) => f.debug_tuple("Time").field(t).finish(),
            Value::Address(a) => write!(f, "Address({:#x})", a),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Int(i as i64)
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(u: $t) -> Self {
                Value::Uint(u as u64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Str(Cow::Owned(c.to_string()))
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::Str(Cow::Borrowed(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Cow::Owned(s))
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(Cow::Owned(s.clone()))
    }
}

impl From<Cow<'static, str>> for Value {
    fn from(s: Cow<'static, str>) -> Self {
        Value::Str(s)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<DateTime<Local>> for Value {
    fn from(t: DateTime<Local>) -> Self {
        Value::Time(t)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t.with_timezone(&Local))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        Value::Optional(opt.map(|v| Box::new(v.into())))
    }
}

impl<T: Into<Value>> From<Box<T>> for Value {
    fn from(b: Box<T>) -> Self {
        Value::Optional(Some(Box::new((*b).into())))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Value::Seq(items.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<Value>, V: Into<Value>, S> From<HashMap<K, V, S>> for Value {
    fn from(map: HashMap<K, V, S>) -> Self {
        Value::map(map)
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        Value::map(map)
    }
}

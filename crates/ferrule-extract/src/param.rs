//! Declared action parameters.

use crate::value::ArgValue;
use bytes::Bytes;
use serde::de::{DeserializeOwned, Error as _};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type DecodeFn = dyn Fn(&str) -> Result<Box<dyn Any + Send>, serde_json::Error> + Send + Sync;

/// A structured type decoded from JSON.
///
/// The concrete Rust type is erased here and recovered with
/// [`Arguments::take_model`](crate::Arguments::take_model).
#[derive(Clone)]
pub struct ModelType {
    type_name: &'static str,
    decode: Arc<DecodeFn>,
}

impl ModelType {
    /// Creates a model type for any deserializable `T`.
    #[must_use]
    pub fn of<T: DeserializeOwned + Send + 'static>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            decode: Arc::new(|text| {
                serde_json::from_str::<T>(text).map(|value| Box::new(value) as Box<dyn Any + Send>)
            }),
        }
    }

    /// Returns the Rust type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn decode(&self, text: &str) -> Result<Box<dyn Any + Send>, serde_json::Error> {
        (self.decode)(text)
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// The type of a declared parameter.
#[derive(Debug, Clone)]
pub enum ParamType {
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// Text.
    Str,
    /// One of a fixed set of names, matched case-insensitively.
    Enum(Vec<String>),
    /// Raw bytes.
    Bytes,
    /// A single uploaded file.
    File,
    /// Every uploaded file.
    Files,
    /// A structured type decoded from JSON.
    Model(ModelType),
}

impl ParamType {
    /// Returns `true` for types that key/value sources can populate.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::File | Self::Files | Self::Model(_))
    }

    /// Returns a short name for logs and error messages.
    #[must_use]
    pub fn describe(&self) -> &str {
        match self {
            Self::Int => "integer",
            Self::Float => "float",
            Self::Bool => "boolean",
            Self::Str => "string",
            Self::Enum(_) => "enumeration",
            Self::Bytes => "bytes",
            Self::File => "file",
            Self::Files => "file collection",
            Self::Model(model) => model.type_name(),
        }
    }

    /// Decodes a whole JSON document into a value of this type.
    pub(crate) fn decode_json(&self, text: &str) -> Result<ArgValue, serde_json::Error> {
        match self {
            Self::Int => serde_json::from_str(text).map(ArgValue::Int),
            Self::Float => serde_json::from_str(text).map(ArgValue::Float),
            Self::Bool => serde_json::from_str(text).map(ArgValue::Bool),
            Self::Str => serde_json::from_str(text).map(ArgValue::Str),
            Self::Bytes => serde_json::from_str::<Vec<u8>>(text)
                .map(|bytes| ArgValue::Bytes(Bytes::from(bytes))),
            Self::Enum(variants) => {
                let name: String = serde_json::from_str(text)?;
                match_variant(variants, &name)
                    .map(ArgValue::Enum)
                    .ok_or_else(|| {
                        serde_json::Error::custom(format!(
                            "'{name}' is not one of {}",
                            variants.join(", ")
                        ))
                    })
            }
            Self::File | Self::Files => Err(serde_json::Error::custom(
                "file parameters cannot be read from JSON",
            )),
            Self::Model(model) => model.decode(text).map(ArgValue::Model),
        }
    }
}

/// Finds the declared spelling of an enumeration variant.
pub(crate) fn match_variant(variants: &[String], candidate: &str) -> Option<String> {
    variants
        .iter()
        .find(|variant| variant.eq_ignore_ascii_case(candidate))
        .cloned()
}

/// A default value for a parameter the request does not supply.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Integer default.
    Int(i64),
    /// Float default.
    Float(f64),
    /// Boolean default.
    Bool(bool),
    /// Text default. Also used for enumerations.
    Str(String),
    /// Bytes default.
    Bytes(Bytes),
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// One declared parameter of an action.
///
/// # Example
///
/// ```
/// use ferrule_extract::{ParameterSpec, ParamType};
///
/// let page = ParameterSpec::int("page").with_default(1);
/// let avatar = ParameterSpec::file("avatar");
/// let tags = ParameterSpec::string("tags").from_body();
///
/// assert_eq!(page.name(), "page");
/// assert!(matches!(avatar.param_type(), ParamType::File));
/// assert!(tags.is_from_body());
/// ```
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    name: String,
    param_type: ParamType,
    from_body: bool,
    default: Option<ScalarValue>,
}

impl ParameterSpec {
    /// Creates a parameter of any type.
    #[must_use]
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            from_body: false,
            default: None,
        }
    }

    /// Creates an integer parameter.
    #[must_use]
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Int)
    }

    /// Creates a float parameter.
    #[must_use]
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Float)
    }

    /// Creates a boolean parameter.
    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Bool)
    }

    /// Creates a string parameter.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Str)
    }

    /// Creates an enumeration parameter accepting the given names.
    #[must_use]
    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            ParamType::Enum(variants.into_iter().map(Into::into).collect()),
        )
    }

    /// Creates a bytes parameter.
    #[must_use]
    pub fn bytes(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Bytes)
    }

    /// Creates a single-file parameter.
    #[must_use]
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::File)
    }

    /// Creates a parameter receiving every uploaded file.
    #[must_use]
    pub fn files(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Files)
    }

    /// Creates a structured parameter decoded from JSON into `T`.
    #[must_use]
    pub fn model<T: DeserializeOwned + Send + 'static>(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Model(ModelType::of::<T>()))
    }

    /// Marks the parameter as bound from the body only.
    #[must_use]
    pub fn from_body(mut self) -> Self {
        self.from_body = true;
        self
    }

    /// Sets the value used when the request does not supply one.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<ScalarValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameter type.
    #[must_use]
    pub const fn param_type(&self) -> &ParamType {
        &self.param_type
    }

    /// Returns `true` when query and form values must be ignored.
    #[must_use]
    pub const fn is_from_body(&self) -> bool {
        self.from_body
    }

    /// Returns the default value.
    #[must_use]
    pub const fn default_value(&self) -> Option<&ScalarValue> {
        self.default.as_ref()
    }

    /// The value the argument starts with before any source is consulted.
    pub(crate) fn initial_value(&self) -> ArgValue {
        match (&self.default, &self.param_type) {
            (None, _) => ArgValue::Empty,
            (Some(ScalarValue::Str(value)), ParamType::Enum(_)) => ArgValue::Enum(value.clone()),
            (Some(ScalarValue::Int(value)), _) => ArgValue::Int(*value),
            (Some(ScalarValue::Float(value)), _) => ArgValue::Float(*value),
            (Some(ScalarValue::Bool(value)), _) => ArgValue::Bool(*value),
            (Some(ScalarValue::Str(value)), _) => ArgValue::Str(value.clone()),
            (Some(ScalarValue::Bytes(value)), _) => ArgValue::Bytes(value.clone()),
        }
    }
}

//! Bound argument values and typed access to them.

use crate::error::ArgumentError;
use crate::param::ParameterSpec;
use bytes::Bytes;
use ferrule_core::FilePart;
use std::any::Any;
use std::fmt;

/// A bound argument.
///
/// `Empty` means no source supplied a value and no default was declared.
/// Typed accessors read it as the type's empty value (`0`, `false`, `""`,
/// no files) and `Option<T>` reads it as `None`.
pub enum ArgValue {
    /// Nothing bound.
    Empty,
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Text.
    Str(String),
    /// Declared spelling of an enumeration variant.
    Enum(String),
    /// Raw bytes.
    Bytes(Bytes),
    /// One uploaded file.
    File(FilePart),
    /// Every uploaded file.
    Files(Vec<FilePart>),
    /// A decoded structured value.
    Model(Box<dyn Any + Send>),
}

impl ArgValue {
    /// Returns the value kind, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::Str(_) => "string",
            Self::Enum(_) => "enumeration",
            Self::Bytes(_) => "bytes",
            Self::File(_) => "file",
            Self::Files(_) => "file collection",
            Self::Model(_) => "model",
        }
    }

    /// Returns `true` when nothing was bound.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Enum(v) => f.debug_tuple("Enum").field(v).finish(),
            Self::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Self::File(v) => f.debug_tuple("File").field(&v.name()).finish(),
            Self::Files(v) => f.debug_tuple("Files").field(&v.len()).finish(),
            Self::Model(_) => f.write_str("Model(..)"),
        }
    }
}

/// Conversion from a bound value into a Rust type.
pub trait FromArgument: Sized {
    /// Name of the target type, used in error messages.
    const EXPECTED: &'static str;

    /// Converts the value, handing it back on mismatch.
    fn from_argument(value: ArgValue) -> Result<Self, ArgValue>;
}

impl FromArgument for i64 {
    const EXPECTED: &'static str = "i64";

    fn from_argument(value: ArgValue) -> Result<Self, ArgValue> {
        match value {
            ArgValue::Int(v) => Ok(v),
            ArgValue::Empty => Ok(0),
            other => Err(other),
        }
    }
}

impl FromArgument for i32 {
    const EXPECTED: &'static str = "i32";

    fn from_argument(value: ArgValue) -> Result<Self, ArgValue> {
        match value {
            ArgValue::Int(v) => Self::try_from(v).map_err(|_| ArgValue::Int(v)),
            ArgValue::Empty => Ok(0),
            other => Err(other),
        }
    }
}

impl FromArgument for u64 {
    const EXPECTED: &'static str = "u64";

    fn from_argument(value: ArgValue) -> Result<Self, ArgValue> {
        match value {
            ArgValue::Int(v) => Self::try_from(v).map_err(|_| ArgValue::Int(v)),
            ArgValue::Empty => Ok(0),
            other => Err(other),
        }
    }
}

impl FromArgument for f64 {
    const EXPECTED: &'static str = "f64";

    fn from_argument(value: ArgValue) -> Result<Self, ArgValue> {
        match value {
            ArgValue::Float(v) => Ok(v),
            ArgValue::Empty => Ok(0.0),
            other => Err(other),
        }
    }
}

impl FromArgument for bool {
    const EXPECTED: &'static str = "bool";

    fn from_argument(value: ArgValue) -> Result<Self, ArgValue> {
        match value {
            ArgValue::Bool(v) => Ok(v),
            ArgValue::Empty => Ok(false),
            other => Err(other),
        }
    }
}

impl FromArgument for String {
    const EXPECTED: &'static str = "String";

    fn from_argument(value: ArgValue) -> Result<Self, ArgValue> {
        match value {
            ArgValue::Str(v) | ArgValue::Enum(v) => Ok(v),
            ArgValue::Empty => Ok(Self::new()),
            other => Err(other),
        }
    }
}

impl FromArgument for Bytes {
    const EXPECTED: &'static str = "Bytes";

    fn from_argument(value: ArgValue) -> Result<Self, ArgValue> {
        match value {
            ArgValue::Bytes(v) => Ok(v),
            ArgValue::Empty => Ok(Self::new()),
            other => Err(other),
        }
    }
}

impl FromArgument for Vec<u8> {
    const EXPECTED: &'static str = "Vec<u8>";

    fn from_argument(value: ArgValue) -> Result<Self, ArgValue> {
        Bytes::from_argument(value).map(|bytes| bytes.to_vec())
    }
}

impl FromArgument for FilePart {
    const EXPECTED: &'static str = "FilePart";

    fn from_argument(value: ArgValue) -> Result<Self, ArgValue> {
        match value {
            ArgValue::File(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl FromArgument for Vec<FilePart> {
    const EXPECTED: &'static str = "Vec<FilePart>";

    fn from_argument(value: ArgValue) -> Result<Self, ArgValue> {
        match value {
            ArgValue::Files(v) => Ok(v),
            ArgValue::File(v) => Ok(vec![v]),
            ArgValue::Empty => Ok(Self::new()),
            other => Err(other),
        }
    }
}

impl<T: FromArgument> FromArgument for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_argument(value: ArgValue) -> Result<Self, ArgValue> {
        match value {
            ArgValue::Empty => Ok(None),
            other => T::from_argument(other).map(Some),
        }
    }
}

/// The arguments bound for one invocation, in declaration order.
///
/// # Example
///
/// ```
/// use ferrule_extract::{ArgValue, Arguments};
///
/// let mut args = Arguments::new()
///     .with("id", ArgValue::Int(7))
///     .with("name", ArgValue::Empty);
///
/// let id: i64 = args.take("id").unwrap();
/// let name: Option<String> = args.take("name").unwrap();
/// assert_eq!(id, 7);
/// assert_eq!(name, None);
/// ```
#[derive(Debug, Default)]
pub struct Arguments {
    entries: Vec<(String, Option<ArgValue>)>,
}

impl Arguments {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes one argument per parameter from its default.
    pub(crate) fn initial(params: &[ParameterSpec]) -> Self {
        Self {
            entries: params
                .iter()
                .map(|param| (param.name().to_string(), Some(param.initial_value())))
                .collect(),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: ArgValue) -> Self {
        self.entries.push((name.into(), Some(value)));
        self
    }

    /// Replaces the argument at a declaration index.
    pub(crate) fn set(&mut self, index: usize, value: ArgValue) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.1 = Some(value);
        }
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the action declares no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the argument names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Borrows an argument that has not been taken yet.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Moves an argument out as a Rust value.
    pub fn take<T: FromArgument>(&mut self, name: &str) -> Result<T, ArgumentError> {
        let value = self.take_raw(name)?;
        T::from_argument(value).map_err(|found| ArgumentError::TypeMismatch {
            name: name.to_string(),
            expected: T::EXPECTED,
            found: found.kind(),
        })
    }

    /// Moves a decoded model out. `None` when nothing was bound.
    pub fn take_model<T: 'static>(&mut self, name: &str) -> Result<Option<T>, ArgumentError> {
        match self.take_raw(name)? {
            ArgValue::Empty => Ok(None),
            ArgValue::Model(boxed) => match boxed.downcast::<T>() {
                Ok(model) => Ok(Some(*model)),
                Err(_) => Err(ArgumentError::TypeMismatch {
                    name: name.to_string(),
                    expected: std::any::type_name::<T>(),
                    found: "model",
                }),
            },
            other => Err(ArgumentError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
                found: other.kind(),
            }),
        }
    }

    fn take_raw(&mut self, name: &str) -> Result<ArgValue, ArgumentError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
            .ok_or_else(|| ArgumentError::Unknown {
                name: name.to_string(),
            })?;
        slot.take().ok_or_else(|| ArgumentError::AlreadyTaken {
            name: name.to_string(),
        })
    }
}

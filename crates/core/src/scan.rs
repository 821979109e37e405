use uuid::Uuid;

use crate::{DbValue, ScanError};

/// A column value that may be SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nullable<T> {
    Valid(T),
    Invalid,
}

pub type NullBytes = Nullable<Vec<u8>>;
pub type NullUuid = Nullable<Uuid>;

/// Payload types a [`Nullable`] can be decoded into.
pub trait FromDbValue: Sized {
    const TARGET: &'static str;

    /// The payload reported while the wrapper is [`Nullable::Invalid`].
    fn zero() -> Self;

    /// Decodes a non-null value.
    fn from_db_value(value: DbValue) -> Result<Self, ScanError>;
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Self::Invalid
    }
}

impl<T> Nullable<T> {
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub const fn as_option(&self) -> Option<&T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid => None,
        }
    }
}

impl<T> Nullable<T>
where
    T: FromDbValue,
{
    pub fn decode(value: DbValue) -> Result<Self, ScanError> {
        if value.is_null() {
            return Ok(Self::Invalid);
        }
        T::from_db_value(value).map(Self::Valid)
    }

    /// Replaces the current state with the decoded value. On error the
    /// wrapper is left untouched.
    pub fn scan(&mut self, value: DbValue) -> Result<(), ScanError> {
        *self = Self::decode(value)?;
        Ok(())
    }

    /// The payload, or the zero value when invalid.
    pub fn payload(&self) -> T
    where
        T: Clone,
    {
        match self {
            Self::Valid(value) => value.clone(),
            Self::Invalid => T::zero(),
        }
    }
}

impl FromDbValue for Vec<u8> {
    const TARGET: &'static str = "NullBytes";

    fn zero() -> Self {
        Vec::new()
    }

    fn from_db_value(value: DbValue) -> Result<Self, ScanError> {
        match value {
            DbValue::Bytes(bytes) => Ok(bytes),
            other => Err(type_mismatch::<Self>(&other)),
        }
    }
}

impl FromDbValue for Uuid {
    const TARGET: &'static str = "NullUuid";

    fn zero() -> Self {
        Uuid::nil()
    }

    fn from_db_value(value: DbValue) -> Result<Self, ScanError> {
        match value {
            DbValue::Text(text) => {
                Uuid::parse_str(&text).map_err(|source| format_error::<Self>(text, source))
            }
            // PostgreSQL sends `uuid` columns as 16 raw bytes in binary format.
            DbValue::Bytes(bytes) if bytes.len() == 16 => Uuid::from_slice(&bytes)
                .map_err(|source| format_error::<Self>(render_bytes(&bytes), source)),
            DbValue::Bytes(bytes) => Uuid::try_parse_ascii(&bytes)
                .map_err(|source| format_error::<Self>(render_bytes(&bytes), source)),
            other => Err(type_mismatch::<Self>(&other)),
        }
    }
}

fn type_mismatch<T: FromDbValue>(value: &DbValue) -> ScanError {
    ScanError::TypeMismatch {
        target: T::TARGET,
        found: value.type_name(),
    }
}

fn format_error<T: FromDbValue>(value: String, source: uuid::Error) -> ScanError {
    ScanError::Format {
        target: T::TARGET,
        value,
        source: Box::new(source),
    }
}

fn render_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

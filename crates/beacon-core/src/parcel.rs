//! Flat, ordered field container for moving readings across a process
//! boundary.
//!
//! A [`Parcel`] is a sequence of primitive values (strings and 32-bit
//! integers) written and read back in the same order, with no field names.
//! With serde it is a plain JSON array:
//!
//! ```json
//! ["e2c56db5-dffb-48d2-b060-d0f5a71096e0", "Lobby", "AA:BB:CC:DD:EE:FF", 1, 2, -59, -70]
//! ```
//!
//! Reads past the end or of the wrong type fail with [`ParcelError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Errors raised while reading a [`Parcel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParcelError {
    /// A read was attempted past the last value.
    #[error("Parcel ended before field '{field}' could be read")]
    Underflow {
        /// Field being read.
        field: &'static str,
    },

    /// The value at the read position has a different type.
    #[error("Parcel field '{field}' is not a {expected}")]
    TypeMismatch {
        /// Field being read.
        field: &'static str,
        /// Type the reader asked for.
        expected: &'static str,
    },
}

/// Result alias for parcel reads.
pub type ParcelResult<T> = std::result::Result<T, ParcelError>;

/// One primitive slot in a [`Parcel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ParcelValue {
    /// 32-bit signed integer.
    Int(i32),
    /// UTF-8 string.
    Str(String),
}

/// Ordered sequence of primitive values with a read cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parcel {
    values: Vec<ParcelValue>,
    #[serde(skip)]
    position: usize,
}

impl Parcel {
    /// Create an empty parcel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parcel positioned at its first value.
    #[must_use]
    pub const fn from_values(values: Vec<ParcelValue>) -> Self {
        Self {
            values,
            position: 0,
        }
    }

    /// Append a string.
    pub fn write_string(&mut self, value: impl Into<String>) {
        self.values.push(ParcelValue::Str(value.into()));
    }

    /// Append an integer.
    pub fn write_int(&mut self, value: i32) {
        self.values.push(ParcelValue::Int(value));
    }

    /// Read the next value as a string.
    ///
    /// # Errors
    ///
    /// Returns [`ParcelError::Underflow`] at the end of the parcel and
    /// [`ParcelError::TypeMismatch`] if the next value is an integer. The
    /// cursor only advances on success.
    pub fn read_string(&mut self, field: &'static str) -> ParcelResult<String> {
        match self.values.get(self.position) {
            Some(ParcelValue::Str(value)) => {
                self.position += 1;
                Ok(value.clone())
            }
            Some(ParcelValue::Int(_)) => Err(ParcelError::TypeMismatch {
                field,
                expected: "string",
            }),
            None => Err(ParcelError::Underflow { field }),
        }
    }

    /// Read the next value as an integer.
    ///
    /// # Errors
    ///
    /// Returns [`ParcelError::Underflow`] at the end of the parcel and
    /// [`ParcelError::TypeMismatch`] if the next value is a string.
    pub fn read_int(&mut self, field: &'static str) -> ParcelResult<i32> {
        match self.values.get(self.position) {
            Some(ParcelValue::Int(value)) => {
                self.position += 1;
                Ok(*value)
            }
            Some(ParcelValue::Str(_)) => Err(ParcelError::TypeMismatch {
                field,
                expected: "integer",
            }),
            None => Err(ParcelError::Underflow { field }),
        }
    }

    /// Read an integer if one is next, leaving the cursor alone otherwise.
    pub fn read_optional_int(&mut self) -> Option<i32> {
        match self.values.get(self.position) {
            Some(ParcelValue::Int(value)) => {
                self.position += 1;
                Some(*value)
            }
            _ => None,
        }
    }

    /// Number of values not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len().saturating_sub(self.position)
    }

    /// Move the cursor back to the first value.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// All values, regardless of the cursor.
    #[must_use]
    pub fn values(&self) -> &[ParcelValue] {
        &self.values
    }

    /// Total number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the parcel holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Types that can be flattened into, and rebuilt from, a [`Parcel`].
pub trait Parcelable: Sized {
    /// Append this value's fields to `parcel`.
    fn write_to_parcel(&self, parcel: &mut Parcel);

    /// Rebuild a value from the fields at the parcel's cursor.
    ///
    /// # Errors
    ///
    /// Returns a [`ParcelError`] if the parcel is short or mistyped.
    fn from_parcel(parcel: &mut Parcel) -> ParcelResult<Self>;

    /// Convenience: write into a fresh parcel.
    fn to_parcel(&self) -> Parcel {
        let mut parcel = Parcel::new();
        self.write_to_parcel(&mut parcel);
        parcel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_in_order() {
        let mut parcel = Parcel::new();
        parcel.write_string("a");
        parcel.write_int(-7);

        assert_eq!(parcel.read_string("first").unwrap(), "a");
        assert_eq!(parcel.read_int("second").unwrap(), -7);
        assert_eq!(parcel.remaining(), 0);
    }

    #[test]
    fn test_underflow() {
        let mut parcel = Parcel::new();
        assert_eq!(
            parcel.read_int("major"),
            Err(ParcelError::Underflow { field: "major" })
        );
    }

    #[test]
    fn test_type_mismatch_does_not_advance() {
        let mut parcel = Parcel::from_values(vec![ParcelValue::Int(3)]);
        assert_eq!(
            parcel.read_string("name"),
            Err(ParcelError::TypeMismatch {
                field: "name",
                expected: "string"
            })
        );
        assert_eq!(parcel.read_int("minor").unwrap(), 3);
    }

    #[test]
    fn test_optional_int() {
        let mut parcel = Parcel::from_values(vec![
            ParcelValue::Int(9),
            ParcelValue::Str("x".into()),
        ]);
        assert_eq!(parcel.read_optional_int(), Some(9));
        assert_eq!(parcel.read_optional_int(), None);
        assert_eq!(parcel.remaining(), 1);
    }

    #[test]
    fn test_json_is_flat_array() {
        let mut parcel = Parcel::new();
        parcel.write_string("uuid");
        parcel.write_int(1);
        let json = serde_json::to_string(&parcel).unwrap();
        assert_eq!(json, r#"["uuid",1]"#);

        let mut parsed: Parcel = serde_json::from_str(r#"["x", -59, 4]"#).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed.read_string("s").unwrap(), "x");
        assert_eq!(parsed.read_int("i").unwrap(), -59);
    }

    #[test]
    fn test_rewind() {
        let mut parcel = Parcel::from_values(vec![ParcelValue::Int(1)]);
        parcel.read_int("a").unwrap();
        parcel.rewind();
        assert_eq!(parcel.remaining(), 1);
    }
}

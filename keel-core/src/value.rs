use rust_decimal::Decimal;
use std::fmt::{self, Display};
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed value moved between records, statements and result rows.
///
/// Every typed variant carries an `Option`, `None` meaning SQL `NULL` while
/// still remembering the type of the field it came from.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    Uuid(Option<Uuid>),
    /// Textual value whose type is not known, text protocols return these.
    Unknown(Option<String>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::Unknown(l), Self::Unknown(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::UInt8(v) => v.is_none(),
            Value::UInt16(v) => v.is_none(),
            Value::UInt32(v) => v.is_none(),
            Value::UInt64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Date(v) => v.is_none(),
            Value::Time(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
            Value::Unknown(v) => v.is_none(),
        }
    }

    /// Null or a zero length text / blob.
    ///
    /// Lookups resolving a nested record only filter on fields that are not empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => v.is_empty(),
            Value::Blob(Some(v)) => v.is_empty(),
            v => v.is_null(),
        }
    }

    /// Values rendered without quotes in a statement.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int8(..)
                | Value::Int16(..)
                | Value::Int32(..)
                | Value::Int64(..)
                | Value::UInt8(..)
                | Value::UInt16(..)
                | Value::UInt32(..)
                | Value::UInt64(..)
                | Value::Float32(..)
                | Value::Float64(..)
                | Value::Decimal(..)
        )
    }

    /// The same variant holding `None`.
    pub fn as_null(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(None),
            Value::Int8(..) => Value::Int8(None),
            Value::Int16(..) => Value::Int16(None),
            Value::Int32(..) => Value::Int32(None),
            Value::Int64(..) => Value::Int64(None),
            Value::UInt8(..) => Value::UInt8(None),
            Value::UInt16(..) => Value::UInt16(None),
            Value::UInt32(..) => Value::UInt32(None),
            Value::UInt64(..) => Value::UInt64(None),
            Value::Float32(..) => Value::Float32(None),
            Value::Float64(..) => Value::Float64(None),
            Value::Decimal(..) => Value::Decimal(None),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Date(..) => Value::Date(None),
            Value::Time(..) => Value::Time(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::Uuid(..) => Value::Uuid(None),
            Value::Unknown(..) => Value::Unknown(None),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! display {
            ($v:expr) => {
                match $v {
                    Some(v) => write!(f, "{}", v),
                    None => f.write_str("NULL"),
                }
            };
        }
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => display!(v),
            Value::Int8(v) => display!(v),
            Value::Int16(v) => display!(v),
            Value::Int32(v) => display!(v),
            Value::Int64(v) => display!(v),
            Value::UInt8(v) => display!(v),
            Value::UInt16(v) => display!(v),
            Value::UInt32(v) => display!(v),
            Value::UInt64(v) => display!(v),
            Value::Float32(v) => display!(v),
            Value::Float64(v) => display!(v),
            Value::Decimal(v) => display!(v),
            Value::Varchar(v) | Value::Unknown(v) => display!(v),
            Value::Blob(Some(v)) => write!(f, "<{} bytes>", v.len()),
            Value::Blob(None) => f.write_str("NULL"),
            Value::Date(v) => display!(v),
            Value::Time(v) => display!(v),
            Value::Timestamp(v) => display!(v),
            Value::Uuid(v) => display!(v),
        }
    }
}

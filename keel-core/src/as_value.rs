use crate::{Error, Result, Value, truncate_long};
use anyhow::Context;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::{any, str::FromStr};
use time::{Date, PrimitiveDateTime, Time, macros::format_description};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// Entity fields are read into values when statements are planned and written
/// back from result rows during materialization.
///
/// # Conversion contract
/// - `try_from_value` accepts the canonical variant for the type.
/// - Integers accept every other integer variant after a range check.
/// - Textual variants (`Varchar`, `Unknown`) are parsed through [`AsValue::parse`],
///   drivers speaking a text protocol rely on this.
///
/// ```rust
/// use keel_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The `NULL` value of the variant this type converts to.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Parse the textual representation returned by a driver.
    fn parse(input: impl AsRef<str>) -> Result<Self>
    where
        Self: Sized,
    {
        Err(Error::msg(format!(
            "Cannot parse `{}` as {}",
            truncate_long!(input.as_ref()),
            any::type_name::<Self>()
        )))
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {:?} to {}",
        value,
        any::type_name::<T>()
    ))
}

fn parse_str<T: FromStr>(input: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    input.trim().parse::<T>().with_context(|| {
        format!(
            "Cannot parse `{}` as {}",
            truncate_long!(input),
            any::type_name::<T>()
        )
    })
}

macro_rules! impl_as_value_integer {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                #[allow(unreachable_patterns)]
                let wide: i128 = match value {
                    $destination(Some(v)) => return Ok(v),
                    Value::Int8(Some(v)) => v as _,
                    Value::Int16(Some(v)) => v as _,
                    Value::Int32(Some(v)) => v as _,
                    Value::Int64(Some(v)) => v as _,
                    Value::UInt8(Some(v)) => v as _,
                    Value::UInt16(Some(v)) => v as _,
                    Value::UInt32(Some(v)) => v as _,
                    Value::UInt64(Some(v)) => v as _,
                    Value::Boolean(Some(v)) => v as _,
                    Value::Decimal(Some(v)) if v.fract().is_zero() => {
                        v.to_i128().ok_or_else(|| mismatch::<Self>(&value))?
                    }
                    Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                        return <Self as AsValue>::parse(v);
                    }
                    _ => return Err(mismatch::<Self>(&value)),
                };
                <$source>::try_from(wide).map_err(|_| {
                    Error::msg(format!(
                        "Value {} is out of range for {}",
                        wide,
                        any::type_name::<Self>()
                    ))
                })
            }
            fn parse(input: impl AsRef<str>) -> Result<Self> {
                parse_str(input.as_ref())
            }
        }
    };
}

impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);
impl_as_value_integer!(u8, Value::UInt8);
impl_as_value_integer!(u16, Value::UInt16);
impl_as_value_integer!(u32, Value::UInt32);
impl_as_value_integer!(u64, Value::UInt64);

macro_rules! impl_as_value_float {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                #[allow(unreachable_patterns)]
                match value {
                    $destination(Some(v)) => Ok(v),
                    Value::Float32(Some(v)) => Ok(v as _),
                    Value::Float64(Some(v)) => Ok(v as _),
                    Value::Int8(Some(v)) => Ok(v as _),
                    Value::Int16(Some(v)) => Ok(v as _),
                    Value::Int32(Some(v)) => Ok(v as _),
                    Value::Int64(Some(v)) => Ok(v as _),
                    Value::UInt8(Some(v)) => Ok(v as _),
                    Value::UInt16(Some(v)) => Ok(v as _),
                    Value::UInt32(Some(v)) => Ok(v as _),
                    Value::UInt64(Some(v)) => Ok(v as _),
                    Value::Decimal(Some(v)) => v
                        .to_f64()
                        .map(|v| v as _)
                        .ok_or_else(|| mismatch::<Self>(&value)),
                    Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                        <Self as AsValue>::parse(v)
                    }
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
            fn parse(input: impl AsRef<str>) -> Result<Self> {
                parse_str(input.as_ref())
            }
        }
    };
}

impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                <Self as AsValue>::parse(v)
            }
            ref v if v.is_numeric() && !v.is_null() => match i64::try_from_value(value.clone()) {
                Ok(0) => Ok(false),
                Ok(1) => Ok(true),
                _ => Err(mismatch::<Self>(&value)),
            },
            _ => Err(mismatch::<Self>(&value)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        match input.as_ref().trim() {
            "1" | "true" | "TRUE" => Ok(true),
            "0" | "false" | "FALSE" => Ok(false),
            v => Err(Error::msg(format!(
                "Cannot parse `{}` as bool",
                truncate_long!(v)
            ))),
        }
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Float32(Some(v)) => {
                Decimal::from_f32(v).ok_or_else(|| mismatch::<Self>(&value))
            }
            Value::Float64(Some(v)) => {
                Decimal::from_f64(v).ok_or_else(|| mismatch::<Self>(&value))
            }
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                <Self as AsValue>::parse(v)
            }
            ref v if v.is_numeric() && !v.is_null() => {
                i64::try_from_value(value.clone()).map(Decimal::from)
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        parse_str(input.as_ref())
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => Ok(v),
            Value::Blob(Some(v)) => String::from_utf8(v.into_vec())
                .context("Cannot convert a blob that is not valid UTF-8 into String"),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        Ok(input.as_ref().to_owned())
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => Ok(v.into_bytes().into()),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Box::<[u8]>::try_from_value(value).map(Into::into)
    }
}

impl AsValue for Date {
    fn as_empty_value() -> Value {
        Value::Date(None)
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) if v.time() == Time::MIDNIGHT => Ok(v.date()),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                <Self as AsValue>::parse(v)
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        Date::parse(input, format_description!("[year]-[month]-[day]"))
            .with_context(|| format!("Cannot parse `{}` as a date", truncate_long!(input)))
    }
}

impl AsValue for Time {
    fn as_empty_value() -> Value {
        Value::Time(None)
    }
    fn as_value(self) -> Value {
        Value::Time(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                <Self as AsValue>::parse(v)
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        Time::parse(
            input,
            format_description!("[hour]:[minute]:[second].[subsecond]"),
        )
        .or_else(|_| Time::parse(input, format_description!("[hour]:[minute]:[second]")))
        .with_context(|| format!("Cannot parse `{}` as a time", truncate_long!(input)))
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::Date(Some(v)) => Ok(v.midnight()),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                <Self as AsValue>::parse(v)
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        PrimitiveDateTime::parse(
            input,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        )
        .or_else(|_| {
            PrimitiveDateTime::parse(
                input,
                format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
            )
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(
                input,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
            )
        })
        .with_context(|| format!("Cannot parse `{}` as a timestamp", truncate_long!(input)))
    }
}

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Blob(Some(ref v)) => Uuid::from_slice(v).context("Cannot read a uuid from blob"),
            Value::Varchar(Some(ref v)) | Value::Unknown(Some(ref v)) => {
                <Self as AsValue>::parse(v)
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        parse_str(input.as_ref())
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        T::parse(input).map(Some)
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        T::try_from_value(value).map(Box::new)
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        T::parse(input).map(Box::new)
    }
}

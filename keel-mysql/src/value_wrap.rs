use time::{Date, Month, PrimitiveDateTime, Time};

pub(crate) struct ValueWrap(pub(crate) keel_core::Value);

impl From<keel_core::Value> for ValueWrap {
    fn from(value: keel_core::Value) -> Self {
        Self(value)
    }
}

impl From<ValueWrap> for keel_core::Value {
    fn from(value: ValueWrap) -> Self {
        value.0
    }
}

impl mysql_async::prelude::FromValue for ValueWrap {
    type Intermediate = ValueWrap;
}

impl TryFrom<mysql_async::Value> for ValueWrap {
    type Error = mysql_async::FromValueError;
    fn try_from(value: mysql_async::Value) -> Result<Self, Self::Error> {
        type KeelValue = keel_core::Value;
        Ok(match value {
            mysql_async::Value::NULL => KeelValue::Null,
            // The text protocol sends every value as bytes
            mysql_async::Value::Bytes(v) => match String::from_utf8(v) {
                Ok(v) => KeelValue::Unknown(Some(v)),
                Err(e) => KeelValue::Blob(Some(e.into_bytes().into())),
            },
            mysql_async::Value::Int(v) => KeelValue::Int64(v.into()),
            mysql_async::Value::UInt(v) => KeelValue::UInt64(v.into()),
            mysql_async::Value::Float(v) => KeelValue::Float32(v.into()),
            mysql_async::Value::Double(v) => KeelValue::Float64(v.into()),
            mysql_async::Value::Date(year, month, day, hour, minute, second, microsecond) => {
                let Ok(month) = Month::try_from(month) else {
                    return Err(mysql_async::FromValueError(value));
                };
                let Ok(date) = Date::from_calendar_date(year as _, month, day) else {
                    return Err(mysql_async::FromValueError(value));
                };
                let Ok(time) = Time::from_hms_micro(hour, minute, second, microsecond) else {
                    return Err(mysql_async::FromValueError(value));
                };
                KeelValue::Timestamp(Some(PrimitiveDateTime::new(date, time)))
            }
            mysql_async::Value::Time(negative, days, hours, minutes, seconds, micro) => {
                if negative || days > 0 {
                    return Err(mysql_async::FromValueError(value));
                }
                let Ok(time) = Time::from_hms_micro(hours, minutes, seconds, micro) else {
                    return Err(mysql_async::FromValueError(value));
                };
                KeelValue::Time(Some(time))
            }
        }
        .into())
    }
}

impl TryFrom<ValueWrap> for mysql_async::Value {
    type Error = keel_core::Error;

    fn try_from(value: ValueWrap) -> Result<Self, Self::Error> {
        type KeelValue = keel_core::Value;
        type MySqlValue = mysql_async::Value;
        Ok(match value.0 {
            _ if value.0.is_null() => MySqlValue::NULL,
            KeelValue::Boolean(Some(v)) => MySqlValue::from(v),
            KeelValue::Int8(Some(v)) => MySqlValue::from(v),
            KeelValue::Int16(Some(v)) => MySqlValue::from(v),
            KeelValue::Int32(Some(v)) => MySqlValue::from(v),
            KeelValue::Int64(Some(v)) => MySqlValue::from(v),
            KeelValue::UInt8(Some(v)) => MySqlValue::from(v),
            KeelValue::UInt16(Some(v)) => MySqlValue::from(v),
            KeelValue::UInt32(Some(v)) => MySqlValue::from(v),
            KeelValue::UInt64(Some(v)) => MySqlValue::from(v),
            KeelValue::Float32(Some(v)) => MySqlValue::from(v),
            KeelValue::Float64(Some(v)) => MySqlValue::from(v),
            KeelValue::Decimal(Some(v)) => MySqlValue::from(v),
            KeelValue::Varchar(Some(v)) | KeelValue::Unknown(Some(v)) => MySqlValue::from(v),
            KeelValue::Blob(Some(v)) => MySqlValue::Bytes(v.into_vec()),
            KeelValue::Date(Some(v)) => MySqlValue::from(v),
            KeelValue::Time(Some(v)) => MySqlValue::from(v),
            KeelValue::Timestamp(Some(v)) => {
                let year = v.year();
                if year != year.clamp(0, u16::MAX as _) {
                    return Err(keel_core::Error::msg(format!(
                        "Timestamp {} is out of range for MySQL",
                        v
                    )));
                }
                MySqlValue::Date(
                    year as _,
                    v.month().into(),
                    v.day(),
                    v.hour(),
                    v.minute(),
                    v.second(),
                    v.microsecond(),
                )
            }
            KeelValue::Uuid(Some(v)) => MySqlValue::from(v.to_string()),
            v => {
                return Err(keel_core::Error::msg(format!(
                    "keel::Value variant `{:?}` is not supported by MySQL",
                    v
                )));
            }
        })
    }
}

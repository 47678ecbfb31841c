use async_graphql::{InputValueError, InputValueResult, Number, Scalar, ScalarType, Value};
use chrono::{DateTime, TimeZone, Utc};

/// A point in time, as milliseconds since the Unix epoch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Date(pub DateTime<Utc>);

#[Scalar(name = "Date")]
impl ScalarType for Date {
    fn parse(value: Value) -> InputValueResult<Self> {
        let number = match value {
            Value::Number(number) => number,
            other => return Err(InputValueError::expected_type(other)),
        };
        let millis = number
            .as_i64()
            .ok_or_else(|| InputValueError::custom("Date must be an integer"))?;
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(Date)
            .ok_or_else(|| InputValueError::custom("Date out of range"))
    }

    fn to_value(&self) -> Value {
        Value::Number(Number::from(self.0.timestamp_millis()))
    }
}

impl From<DateTime<Utc>> for Date {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_is_epoch_millis() {
        let date = Date(Utc.timestamp_millis_opt(1_704_189_900_123).unwrap());
        assert_eq!(date.to_value(), Value::Number(Number::from(1_704_189_900_123i64)));
        assert_eq!(Date::parse(date.to_value()).unwrap(), date);
    }

    #[test]
    fn test_date_rejects_non_integers() {
        assert!(Date::parse(Value::String("2024-01-01".to_string())).is_err());
        assert!(Date::parse(Value::Number(Number::from_f64(1.5).unwrap())).is_err());
    }
}

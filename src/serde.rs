use std::fmt;

use chrono::DateTime;
use serde::de::{self, Visitor};
use serde::Deserializer;

use crate::config::TimeInput;

/// Accepts `"HH:MM"`, a local ISO datetime string, epoch milliseconds, or
/// `null`.
pub fn optional_time_input<'de, D>(deserializer: D) -> Result<Option<TimeInput>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TimeInputVisitor;

    impl<'de> Visitor<'de> for TimeInputVisitor {
        type Value = Option<TimeInput>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a time string, epoch milliseconds, or null")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            value.parse::<TimeInput>().map(Some).map_err(de::Error::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            DateTime::from_timestamp_millis(v)
                .map(|dt| Some(TimeInput::At(dt.naive_utc())))
                .ok_or_else(|| de::Error::custom(format!("Timestamp out of range: {}", v)))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let v = i64::try_from(v)
                .map_err(|_| de::Error::custom(format!("Timestamp out of range: {}", v)))?;
            self.visit_i64(v)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(TimeInputVisitor)
        }
    }

    deserializer.deserialize_any(TimeInputVisitor)
}

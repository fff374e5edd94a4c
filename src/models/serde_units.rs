//! Serde adapters for measured values in trial files.
//!
//! Latencies travel as fractional seconds and throughputs as KB/s. `null`
//! means "not measured". The legacy markers written by older harnesses
//! (a maximum duration, or `-1.0` KB/s) decode to "not measured" as well.

/// Largest duration older harnesses wrote for an unset latency (999999999 days)
pub(crate) const LEGACY_UNSET_LATENCY_SECS: f64 = 999_999_999.0 * 86_400.0;

/// `Option<Duration>` as `Option<f64>` seconds
pub(crate) mod opt_secs {
    use super::LEGACY_UNSET_LATENCY_SECS;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<f64>::deserialize(deserializer)? {
            None => Ok(None),
            Some(secs) if secs >= LEGACY_UNSET_LATENCY_SECS => Ok(None),
            Some(secs) => Duration::try_from_secs_f64(secs)
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid latency {}s: {}", secs, e))),
        }
    }
}

/// `Option<f64>` KB/s where negative values mean "not measured"
pub(crate) mod opt_kbs {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(kbs) => serializer.serialize_some(kbs),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<f64>::deserialize(deserializer)? {
            None => Ok(None),
            Some(kbs) if kbs.is_nan() => Err(D::Error::custom("throughput cannot be NaN")),
            Some(kbs) if kbs < 0.0 => Ok(None),
            Some(kbs) => Ok(Some(kbs)),
        }
    }
}

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::Deserialize;
use std::time::Duration;

pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms: u64 = Deserialize::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}

// Settings are printed by `finder config`, so durations go back out as milliseconds.
pub fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Hides secrets when settings are displayed.
pub fn serialize_redacted<S, T>(secret: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<str>,
{
    if secret.as_ref().is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("********")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize)]
    struct Timeouts {
        #[serde(
            deserialize_with = "deserialize_duration",
            serialize_with = "serialize_duration"
        )]
        timeout: Duration,
        #[serde(serialize_with = "serialize_redacted")]
        key: String,
    }

    #[test]
    fn should_read_milliseconds_and_hide_secrets() {
        let t: Timeouts = serde_json::from_str(r#"{"timeout": 12000, "key": "abc"}"#).unwrap();
        assert_eq!(t.timeout, Duration::from_secs(12));
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json, serde_json::json!({"timeout": 12000, "key": "********"}));
    }
}

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// A contact-form message as stored by the backend.
///
/// The client only ever reads these; the dashboard lists them as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
    /// `None` when the backend omitted the timestamp or sent one that does
    /// not parse.
    #[serde(
        default,
        rename = "createdAt",
        alias = "submittedAt",
        deserialize_with = "lenient_timestamp"
    )]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// For sending a new message through the public contact form (no id or
/// timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    /// Anything that is not a string (epoch numbers, objects) is dropped.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Other(IgnoredAny),
    }

    let raw: Option<RawTimestamp> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawTimestamp::Text(s)) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        Some(RawTimestamp::Other(_)) | None => None,
    })
}

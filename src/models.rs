use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventRecord {
    pub name: String,
    pub raw_day: String,
    pub raw_month: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub event_type: String,
    pub description: Option<String>,
    pub ticket_link: Option<String>,
    pub event_picture: Option<String>,
}

impl EventRecord {
    /// Stable hash: name|starts_at|location. Conflict key in upsert mode.
    pub fn natural_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update(b"|");
        hasher.update(self.starts_at.to_rfc3339().as_bytes());
        hasher.update(b"|");
        hasher.update(self.location.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

use serde::{Deserialize, Deserializer, Serialize};

/// Pointer to a generated speech file the host can play back and lip-sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRef {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// An inbound message from the chat backend.
///
/// The backend is loose about the `motion` field: it may be a JSON bool, a
/// motion-name string (any non-empty string counts as "play something"), or
/// absent. We normalize all of that to a bool at deserialization time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,

    #[serde(default)]
    pub expression: Option<String>,

    #[serde(default, deserialize_with = "truthy")]
    pub motion: bool,

    #[serde(default, rename = "audio_url")]
    pub audio: Option<AudioRef>,
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Truthy {
        Bool(bool),
        Text(String),
        Null,
    }

    Ok(match Option::<Truthy>::deserialize(deserializer)? {
        Some(Truthy::Bool(b)) => b,
        Some(Truthy::Text(s)) => !s.is_empty(),
        Some(Truthy::Null) | None => false,
    })
}

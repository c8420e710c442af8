use serde::{Deserialize, Serialize};

use crate::{error::ProtocolError, tabs::Tab};

/// Complete, authoritative tab list pushed by the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedEvent {
    pub tabs: Vec<Tab>,
}

/// Messages received from the browser extension, keyed on their `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Updated(UpdatedEvent),
}

#[derive(Deserialize)]
struct EventHeader {
    #[serde(rename = "type")]
    kind: String,
}

impl Event {
    /// Wire tag of this event.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Updated(_) => "updated",
        }
    }

    /// Decode one frame payload.
    ///
    /// The `type` tag is read first so an unrecognised tag is reported as
    /// such rather than as a shape mismatch.
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let header: EventHeader = serde_json::from_slice(payload).map_err(malformed)?;

        match header.kind.as_str() {
            "updated" => serde_json::from_slice(payload)
                .map(Self::Updated)
                .map_err(malformed),
            _ => Err(ProtocolError::UnknownEventType(header.kind)),
        }
    }
}

fn malformed(e: serde_json::Error) -> ProtocolError {
    ProtocolError::MalformedPayload(e.to_string())
}

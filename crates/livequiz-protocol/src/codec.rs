//! Codec trait and the JSON implementation.
//!
//! The protocol layer doesn't care how events become bytes — anything
//! implementing [`Codec`] will do. JSON is the only codec today; it keeps
//! frames inspectable in browser DevTools, which matters more here than
//! wire size (events are small and infrequent).

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because the codec is shared across connection
/// handler tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientEvent, RoomId};

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let ev = ClientEvent::StartQuiz {
            room_id: RoomId::new("R1"),
        };
        let bytes = codec.encode(&ev).unwrap();
        let decoded: ClientEvent = codec.decode(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    #[test]
    fn test_json_codec_rejects_garbage() {
        let codec = JsonCodec;
        let result: Result<ClientEvent, _> = codec.decode(b"not json");
        assert!(result.is_err());
    }
}

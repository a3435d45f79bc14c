//! Binary codec for lease traffic.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Encode a message to bytes.
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, CodecError> {
    Ok(bincode::serde::encode_to_vec(message, bincode::config::standard())?)
}

/// Decode a message from bytes.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, CodecError> {
    let (message, _) = bincode::serde::decode_from_slice(data, bincode::config::standard())?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LeaseMessage, LeaseNotice, ParticipantId};
    use kinetra_physics::BodyId;

    #[test]
    fn test_message_survives_the_wire() {
        let msg = LeaseMessage::ContactEnd {
            body: BodyId(7),
            participant: ParticipantId(2),
        };
        let decoded: LeaseMessage = decode(&encode(&msg).unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_compact_encoding() {
        let notice = LeaseNotice::Granted {
            body: BodyId(3),
            holder: ParticipantId(1),
        };
        let encoded = encode(&notice).unwrap();
        assert!(encoded.len() < 8, "encoded size was {}", encoded.len());
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let result: Result<LeaseNotice, _> = decode(&[0xff, 0xff, 0xff]);
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }
}

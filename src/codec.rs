//! Payload encoding.
//!
//! Session payloads are opaque to the store: they are serialized once in
//! [`encode`] and only deserialized again when a caller asks for them with a
//! concrete type. The wire format is selected at compile time through the
//! `bincode` (default) or `messagepack` features.

use serde::{Serialize, de::DeserializeOwned};

use crate::Error;

#[cfg(feature = "bincode")]
pub fn encode<T>(value: &T) -> Result<Vec<u8>, Error>
where
    T: Serialize + ?Sized,
{
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|err| Error::Encode(err.to_string()))
}

#[cfg(feature = "bincode")]
pub fn decode<T>(bytes: &[u8]) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map(|(value, _)| value)
        .map_err(|err| Error::Decode(err.to_string()))
}

#[cfg(all(feature = "messagepack", not(feature = "bincode")))]
pub fn encode<T>(value: &T) -> Result<Vec<u8>, Error>
where
    T: Serialize + ?Sized,
{
    rmp_serde::to_vec(value).map_err(|err| Error::Encode(err.to_string()))
}

#[cfg(all(feature = "messagepack", not(feature = "bincode")))]
pub fn decode<T>(bytes: &[u8]) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    rmp_serde::from_slice(bytes).map_err(|err| Error::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Visit {
        path: String,
        count: u32,
    }

    #[test]
    fn test_struct_payload() {
        let visit = Visit {
            path: "/home".to_string(),
            count: 3,
        };
        let bytes = encode(&visit).unwrap();
        assert_eq!(decode::<Visit>(&bytes).unwrap(), visit);
    }

    #[test]
    fn test_type_mismatch_is_decode_error() {
        let bytes = encode("hello").unwrap();
        let err = decode::<bool>(&bytes).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = decode::<Visit>(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}

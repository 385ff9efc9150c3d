//! Serialization framework for Cadence.
//!
//! Payloads travel as bytes. A [`DataConverter`] turns JSON values into
//! bytes and back; the typed helpers [`encode_with`] and [`decode_with`]
//! layer serde on top so converters stay object-safe and can be shared as
//! `Arc<dyn DataConverter>`.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;

/// Trait for data converters/serializers
pub trait DataConverter: Send + Sync {
    /// Encode a value to bytes
    fn to_data(&self, value: &serde_json::Value) -> Result<Vec<u8>, EncodingError>;
    /// Decode bytes to a value
    fn from_data(&self, data: &[u8]) -> Result<serde_json::Value, EncodingError>;
}

/// Default JSON data converter
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDataConverter;

impl JsonDataConverter {
    pub fn new() -> Self {
        Self
    }
}

impl DataConverter for JsonDataConverter {
    fn to_data(&self, value: &serde_json::Value) -> Result<Vec<u8>, EncodingError> {
        serde_json::to_vec(value).map_err(|e| EncodingError::Serialization(e.to_string()))
    }

    fn from_data(&self, data: &[u8]) -> Result<serde_json::Value, EncodingError> {
        serde_json::from_slice(data).map_err(|e| EncodingError::Deserialization(e.to_string()))
    }
}

/// The converter used when none is configured.
pub fn default_data_converter() -> Arc<dyn DataConverter> {
    Arc::new(JsonDataConverter::new())
}

/// Encode a typed value through a converter
pub fn encode_with<T: Serialize + ?Sized>(
    converter: &dyn DataConverter,
    value: &T,
) -> Result<Vec<u8>, EncodingError> {
    let value =
        serde_json::to_value(value).map_err(|e| EncodingError::Serialization(e.to_string()))?;
    converter.to_data(&value)
}

/// Decode a typed value through a converter
pub fn decode_with<T: DeserializeOwned>(
    converter: &dyn DataConverter,
    data: &[u8],
) -> Result<T, EncodingError> {
    let value = converter.from_data(data)?;
    serde_json::from_value(value).map_err(|e| EncodingError::Deserialization(e.to_string()))
}

/// Encoding errors
#[derive(Debug, Clone, PartialEq)]
pub enum EncodingError {
    Serialization(String),
    Deserialization(String),
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            EncodingError::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
        }
    }
}

impl std::error::Error for EncodingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestStruct {
        name: String,
        value: i32,
    }

    #[test]
    fn test_multiple_arguments_encode_as_json_array() {
        let converter = JsonDataConverter::new();
        let args = ("hackerman".to_string(), 7);

        let encoded = encode_with(&converter, &args).unwrap();
        assert_eq!(encoded, br#"["hackerman",7]"#.to_vec());

        let decoded: (String, i32) = decode_with(&converter, &encoded).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn test_decode_type_mismatch() {
        let converter = default_data_converter();
        let encoded = encode_with(converter.as_ref(), &"not a struct").unwrap();

        let result: Result<TestStruct, _> = decode_with(converter.as_ref(), &encoded);
        assert!(matches!(result, Err(EncodingError::Deserialization(_))));
    }

    #[test]
    fn test_invalid_bytes() {
        let converter = JsonDataConverter::new();
        let err = converter.from_data(b"{not json").unwrap_err();
        assert!(err.to_string().starts_with("Deserialization error"));
    }
}

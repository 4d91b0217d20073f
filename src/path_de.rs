use serde::de::DeserializeOwned;

use crate::error::DocumentError;

/// Deserialize with JSON-path context in error messages.
pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DocumentError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        DocumentError::Decode(format!("at JSON path {path} → {}", err.into_inner()))
    })
}

pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, DocumentError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
        let path = err.path().to_string();
        DocumentError::Decode(format!("at JSON path {path} → {}", err.into_inner()))
    })
}

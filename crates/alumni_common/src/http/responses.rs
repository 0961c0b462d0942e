use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};

/// Serializes the wrapped value with its `password` field stripped.
#[derive(Debug, Clone)]
pub struct Redacted<T>(pub T);

impl<T: Serialize> Serialize for Redacted<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = serde_json::to_value(&self.0).map_err(S::Error::custom)?;
        match value.as_array_mut() {
            Some(items) => items.iter_mut().for_each(strip_password),
            None => strip_password(&mut value),
        }
        value.serialize(serializer)
    }
}

fn strip_password(value: &mut serde_json::Value) {
    if let Some(object) = value.as_object_mut() {
        object.remove("password");
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

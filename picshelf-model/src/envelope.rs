//! Application-level response wrapper.
//!
//! The backend answers HTTP 200 even when an operation fails and reports the
//! real outcome in `returncode`. Callers have to look at both the transport
//! status and this envelope.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// `returncode` value that marks a successful operation.
pub const SUCCESS_CODE: &str = "200";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(deserialize_with = "deserialize_returncode")]
    pub returncode: String,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// A well-formed response whose `returncode` is not [`SUCCESS_CODE`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("server returned code {code}: {message}")]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            returncode: SUCCESS_CODE.to_string(),
            message: message.into(),
            data,
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            returncode: code.into(),
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.returncode.trim() == SUCCESS_CODE
    }

    /// Splits the envelope into its payload or an [`EnvelopeError`].
    pub fn into_result(self) -> Result<Option<T>, EnvelopeError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(EnvelopeError {
                code: self.returncode,
                message: self.message,
            })
        }
    }

    /// Like [`Envelope::into_result`] but a success without `data` is an
    /// error too.
    pub fn into_data(self) -> Result<T, EnvelopeError> {
        let code = self.returncode.clone();
        match self.into_result()? {
            Some(data) => Ok(data),
            None => Err(EnvelopeError {
                code,
                message: "response carried no data".to_string(),
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Text(String),
    Number(i64),
}

// Some deployments send the code as a bare number.
fn deserialize_returncode<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawCode::deserialize(deserializer)? {
        RawCode::Text(text) => text,
        RawCode::Number(n) => n.to_string(),
    })
}

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

use crate::error::ModelError;

/// Backend identity of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AttachmentId(String);

/// Identity of the asynchronous processing job (the "tx-worker").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

macro_rules! string_id {
    ($ty:ident, $field:literal) => {
        impl $ty {
            /// Rejects empty or whitespace-only ids.
            pub fn parse(value: impl Into<String>) -> Result<Self, ModelError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(ModelError::MissingField($field));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(AttachmentId, "attachment_id");
string_id!(JobId, "job_id");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ids_are_rejected() {
        assert!(AttachmentId::parse("").is_err());
        assert!(JobId::parse("   ").is_err());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = AttachmentId::parse("att-1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"att-1\"");
        assert_eq!(id.to_string(), "att-1");
    }
}

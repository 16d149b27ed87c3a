use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::ACCESS_KEY_FIELD;
use crate::error::{FolioError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    /// Form-encoded key sent to the endpoint.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The contact form's input fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    /// Required-field check, run before anything goes on the wire.
    /// Reports the first offending field in form order.
    pub fn validate(&self) -> Result<()> {
        for field in Field::ALL {
            if self.get(field).trim().is_empty() {
                return Err(FolioError::MissingField(field));
            }
        }
        if !looks_like_email(self.email.trim()) {
            return Err(FolioError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// Reset every input, as after a successful send.
    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }

    /// Form-encoded body: the inputs followed by the injected access key.
    pub fn encode(&self, access_key: &str) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = Field::ALL
            .iter()
            .map(|f| (f.key(), self.get(*f).to_string()))
            .collect();
        pairs.push((ACCESS_KEY_FIELD, access_key.to_string()));
        pairs
    }
}

/// `local@domain` with both halves present and no whitespace.
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.rsplit_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    }
}

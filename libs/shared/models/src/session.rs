use serde::{Deserialize, Serialize};

/// Caller session passed explicitly to whichever service talks to the
/// records store. The scheduling core never sees it; it only travels with
/// boundary reads and submits as a bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub bearer_token: String,
}

impl SessionContext {
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.bearer_token
    }
}

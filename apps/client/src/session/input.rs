//! Input Store: the two pieces of user-entered text.

use serde::Serialize;

use crate::optimizer_client::OptimizeRequest;

/// Holds the primary document (résumé) and the optional context document (job description).
/// Both start empty. No validation happens here beyond the emptiness check consumers ask for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputStore {
    primary: String,
    context: String,
}

impl InputStore {
    pub fn set_primary(&mut self, text: impl Into<String>) {
        self.primary = text.into();
    }

    pub fn set_context(&mut self, text: impl Into<String>) {
        self.context = text.into();
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// An empty string means "no context supplied".
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Presence only: whitespace-only text counts as present.
    pub fn has_primary(&self) -> bool {
        !self.primary.is_empty()
    }

    pub fn to_request(&self) -> OptimizeRequest {
        OptimizeRequest {
            cv_text: self.primary.clone(),
            job_description: self.context.clone(),
        }
    }
}

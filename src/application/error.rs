use std::error::Error as StdError;

use thiserror::Error;

use crate::{application::render::RenderError, infra::error::InfraError};

/// Flattened view of an error and its `source()` chain, outermost first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { messages }
    }

    /// Headline message of the report.
    pub fn summary(&self) -> &str {
        self.messages.first().map(String::as_str).unwrap_or_default()
    }

    /// Messages of the underlying causes, if any.
    pub fn causes(&self) -> &[String] {
        self.messages.get(1..).unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl AppError {
    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error(self)
    }
}

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanerError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("{kind} {name:?} not found")]
    NotFound { kind: &'static str, name: String },

    #[error("expected one master instance for stack {stack:?}, got {count}")]
    UnexpectedInstanceCount { stack: String, count: usize },

    #[error("timed out waiting for deletion of {0:?}")]
    DeletionTimeout(String),

    #[error("failed to list {kind}: {source}")]
    List {
        kind: &'static str,
        #[source]
        source: Box<CleanerError>,
    },

    #[error("failed to {action} {name:?}: {source}")]
    Operation {
        action: &'static str,
        name: String,
        #[source]
        source: Box<CleanerError>,
    },

    #[error("cleaner {cleaner} failed: {errors}")]
    Cleaner {
        cleaner: &'static str,
        errors: ErrorCollection,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CleanerError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn list(kind: &'static str, source: CleanerError) -> Self {
        Self::List {
            kind,
            source: Box::new(source),
        }
    }

    pub fn operation(action: &'static str, name: impl Into<String>, source: CleanerError) -> Self {
        Self::Operation {
            action,
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Reports whether the root cause is a provider "not found" response.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::List { source, .. } | Self::Operation { source, .. } => source.is_not_found(),
            Self::Other(e) => e
                .downcast_ref::<CleanerError>()
                .is_some_and(CleanerError::is_not_found),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanerError>;

/// Errors recorded during one cleanup run, in the order they happened.
///
/// Cleaner failures are nested as [`CleanerError::Cleaner`] entries and
/// flattened again when reported.
#[derive(Debug, Default)]
pub struct ErrorCollection {
    errors: Vec<CleanerError>,
}

impl ErrorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: impl Into<CleanerError>) {
        self.errors.push(error.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[CleanerError] {
        &self.errors
    }

    /// Every recorded error with nested collections expanded in place.
    pub fn flatten(&self) -> Vec<&CleanerError> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a CleanerError>) {
        for error in &self.errors {
            match error {
                CleanerError::Cleaner { errors, .. } => errors.flatten_into(out),
                other => out.push(other),
            }
        }
    }

    pub fn dump(&self) -> String {
        if !self.has_errors() {
            return "No errors.".to_string();
        }

        self.flatten()
            .into_iter()
            .map(|e| format!("- {}\n", e))
            .collect()
    }

    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.has_errors() { Err(self) } else { Ok(()) }
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collection of {} errors", self.errors.len())
    }
}

impl std::error::Error for ErrorCollection {}

impl From<CleanerError> for ErrorCollection {
    fn from(error: CleanerError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::repos::SourceError, config::LoadError, domain::slug::SlugError,
    infra::error::InfraError,
};

/// Failure of a read service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} `{slug}` not found")]
    NotFound { entity: &'static str, slug: String },
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, slug: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            slug: slug.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Map a service failure onto the public HTTP surface.
    pub fn from_service(source: &'static str, error: ServiceError) -> Self {
        match &error {
            ServiceError::NotFound { .. } => {
                Self::from_error(source, StatusCode::NOT_FOUND, "Not found", &error)
            }
            ServiceError::Source(SourceError::Timeout) => Self::from_error(
                source,
                StatusCode::GATEWAY_TIMEOUT,
                "Content source timed out",
                &error,
            ),
            ServiceError::Source(_) => Self::from_error(
                source,
                StatusCode::BAD_GATEWAY,
                "Content source unavailable",
                &error,
            ),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Top-level error returned by the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Slug(#[from] SlugError),
}

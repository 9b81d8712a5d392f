/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

use crate::rest::ErrorCode;
use std::io;
use thiserror::Error;

/// Error conditions that can be returned
#[derive(Error, Debug)]
pub enum FlickrError {
    #[error("I/O error")]
    Io(#[from] io::Error),

    #[error("Request network error")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {0} returned without an API response: {1}")]
    HttpStatus(u16, String),

    #[error("Authorization error. {0}")]
    Auth(String),

    #[error("Deserialization error")]
    Deserialization(#[from] serde_json::Error),

    #[error("URL Parse error")]
    UrlParsing(#[from] url::ParseError),

    #[error("Credential store error: {0}")]
    CredentialStore(String),

    #[error("Configuration error. {0}")]
    Config(String),

    #[error("API Response for '{method}' was error: {code:?}, msg: {message}")]
    ApiResponse {
        method: String,
        code: ErrorCode,
        message: String,
    },

    #[error("API Response for '{0}' is malformed: {1}")]
    ApiResponseMalformed(String, String),
}

/// Coarse classification of a [`FlickrError`].
///
/// Callers that only need to know *where* a call failed branch on this instead of the
/// individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTTP exchange itself failed (connect, TLS, timeout, non-API status)
    Transport,
    /// The body could not be read as an API envelope
    MalformedResponse,
    /// The service answered with `stat: fail`
    Domain,
    /// Signature rejected or the handshake was driven out of order
    Authorization,
    /// The credential store could not be read or written
    Storage,
    /// A configured URL or parameter was unusable
    Configuration,
}

impl FlickrError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlickrError::Request(_) | FlickrError::HttpStatus(..) => ErrorKind::Transport,
            FlickrError::ApiResponseMalformed(..) => ErrorKind::MalformedResponse,
            FlickrError::ApiResponse { code, .. } if code.is_authorization_failure() => {
                ErrorKind::Authorization
            }
            FlickrError::ApiResponse { .. } => ErrorKind::Domain,
            FlickrError::Auth(_) => ErrorKind::Authorization,
            FlickrError::Io(_) | FlickrError::CredentialStore(_) | FlickrError::Deserialization(_) => {
                ErrorKind::Storage
            }
            FlickrError::UrlParsing(_) | FlickrError::Config(_) => ErrorKind::Configuration,
        }
    }

    /// The remote error code when this is a `stat: fail` response
    pub fn api_code(&self) -> Option<ErrorCode> {
        match self {
            FlickrError::ApiResponse { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.api_code() == Some(ErrorCode::NotFound)
    }

    pub(crate) fn malformed(method: &str, reason: impl Into<String>) -> Self {
        FlickrError::ApiResponseMalformed(method.to_string(), reason.into())
    }
}

/// Turns a remote "not found" failure into an absent value.
///
/// Every other error, including other remote codes, is passed through unchanged.
pub trait NotFoundExt<T> {
    fn not_found_as_none(self) -> Result<Option<T>, FlickrError>;
}

impl<T> NotFoundExt<T> for Result<T, FlickrError> {
    fn not_found_as_none(self) -> Result<Option<T>, FlickrError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

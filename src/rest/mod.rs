/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

pub mod api;
pub mod auth;
pub mod client;
pub mod credentials;
pub mod envelope;
pub mod errors;
pub mod favorites;
pub mod pagination;
mod parsers;
pub mod params;
pub mod people;
pub mod photo;
pub mod signer;
pub mod transport;
pub mod user;

pub use api::{ApiClient, ErrorCode};
pub use auth::{AuthState, AuthenticatedIdentity};
pub use client::*;
pub use credentials::*;
pub use envelope::{Envelope, decode, decode_with};
pub use errors::*;
pub use pagination::{Paginated, paginate};
pub use params::ApiParams;
pub use photo::*;
pub use signer::SignedRequest;
pub use transport::{Attachment, HttpVerb};
pub use user::*;

/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! # Flickr
//!
//! Client library for the Flickr REST API acting on behalf of a user.
//!
//! For further details on the API refer to the [Flickr API Docs](https://www.flickr.com/services/api/)
//!
//! ## Features
//!
//! - OAuth 1.0a request signing (HMAC-SHA1)
//! - The three legged authorization handshake, with the resulting access credential kept in
//!   a pluggable [`rest::CredentialStore`]
//! - Decoding of the `stat: ok | fail` response envelope with typed error codes
//! - Paginated results and a stream over every page
//! - A few thin wrappers over people and favorites calls
//! - Lower level interface for handling the raw communication
//!
//! *If you want to use this library for more that is currently implemented, the
//! [`rest::Client`] can invoke any method directly with [`rest::Client::invoke`],
//! [`rest::Client::get`] and [`rest::Client::post`]*
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! flickr = "0.1.0"
//! ```
//!
//! ## Usage
//!
//! **You will need to acquire an API key/secret from Flickr prior to using the API**
//!
//! ```rust,no_run
//! use flickr::rest::{envelope::field, ApiParams, Client, ClientConfig, ErrorCode, FlickrError, User};
//!
//! async fn lookup(client: &Client, username: &str) -> Result<Option<User>, FlickrError> {
//!     let params = ApiParams::new().add("username", username);
//!     match client.get("flickr.people.findByUsername", &params, field("user")).await {
//!         Ok(user) => Ok(Some(user)),
//!         Err(err) if err.api_code() == Some(ErrorCode::NotFound) => Ok(None),
//!         Err(err) => Err(err),
//!     }
//! }
//! ```
//!
pub mod rest;

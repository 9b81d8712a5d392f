/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! The three legged OAuth handshake.
//!
//! ```text
//! Unauthorized --request token--> RequestCredentialObtained
//!              --authorize url--> AwaitingUserGrant
//!              --verifier------->  Authorized
//! ```
//!
//! The request credential only ever lives in memory. The access credential is committed to
//! the [`CredentialStore`](crate::rest::CredentialStore) together with the user id, and only
//! after an identity lookup made with it succeeded.

use crate::rest::api::ApiClient;
use crate::rest::credentials::{AccessGrant, Credential};
use crate::rest::envelope::field;
use crate::rest::errors::FlickrError;
use crate::rest::params::{self, ApiParams};
use crate::rest::parsers::from_content;
use crate::rest::signer::SignedRequest;
use crate::rest::transport::{HttpVerb, RawResponse};
use log::{debug, info};
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

const OAUTH_TOKEN_KEY: &str = "oauth_token";
const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";
const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
const IDENTITY_METHOD: &str = "flickr.test.login";

/// Where the handshake currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthorized,
    RequestCredentialObtained,
    AwaitingUserGrant,
    Authorized,
}

// In-memory progress of an ongoing handshake
#[derive(Debug, Default)]
pub(crate) enum Handshake {
    #[default]
    Idle,
    RequestObtained(Credential),
    AwaitingGrant(Credential),
}

/// The user an access credential was confirmed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub user_id: String,
    pub username: Option<String>,
}

/// Token and secret returned by the token endpoints, plus whatever else came along
/// (`user_nsid`, `username`, `oauth_callback_confirmed`, ...)
#[derive(Debug)]
pub struct TokenResponse {
    pub credential: Credential,
    pub remain: HashMap<String, String>,
}

/// Reads a form encoded token endpoint response
pub fn read_oauth_token(text: &str) -> Result<TokenResponse, FlickrError> {
    let mut destructured: HashMap<String, String> = url::form_urlencoded::parse(text.as_bytes())
        .into_owned()
        .collect();
    let token = destructured.remove(OAUTH_TOKEN_KEY);
    let secret = destructured.remove(OAUTH_TOKEN_SECRET_KEY);
    match (token, secret) {
        (Some(t), Some(s)) => Ok(TokenResponse {
            credential: Credential::new(&t, &s),
            remain: destructured,
        }),
        (None, _) => Err(FlickrError::Auth(format!("'{}' missing from token response", OAUTH_TOKEN_KEY))),
        (_, _) => Err(FlickrError::Auth(format!(
            "'{}' missing from token response",
            OAUTH_TOKEN_SECRET_KEY
        ))),
    }
}

/// Pulls `(verifier, token)` out of the url the user was redirected to,
/// e.g. `http://callback?oauth_token=...&oauth_verifier=...`
pub fn parse_callback(callback_url: &str) -> Result<(String, String), FlickrError> {
    let url = Url::parse(callback_url)?;
    let mut verifier = None;
    let mut token = None;
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            OAUTH_VERIFIER_KEY => verifier = Some(v.into_owned()),
            OAUTH_TOKEN_KEY => token = Some(v.into_owned()),
            _ => (),
        }
    }
    match (verifier, token) {
        (Some(v), Some(t)) => Ok((v, t)),
        _ => Err(FlickrError::Auth(
            "Callback url is missing oauth_verifier or oauth_token".to_string(),
        )),
    }
}

// Expected payload of flickr.test.login
#[derive(Deserialize, Debug)]
struct LoginUser {
    id: String,
    #[serde(default, deserialize_with = "from_content")]
    username: String,
}

impl ApiClient {
    pub(crate) fn auth_state(&self) -> Result<AuthState, FlickrError> {
        if self.access_grant()?.is_some() {
            return Ok(AuthState::Authorized);
        }
        Ok(match *self.lock_handshake()? {
            Handshake::Idle => AuthState::Unauthorized,
            Handshake::RequestObtained(_) => AuthState::RequestCredentialObtained,
            Handshake::AwaitingGrant(_) => AuthState::AwaitingUserGrant,
        })
    }

    fn lock_handshake(&self) -> Result<std::sync::MutexGuard<'_, Handshake>, FlickrError> {
        self.handshake
            .lock()
            .map_err(|_| FlickrError::Auth("handshake lock poisoned".to_string()))
    }

    fn set_handshake(&self, state: Handshake) -> Result<(), FlickrError> {
        *self.lock_handshake()? = state;
        Ok(())
    }

    /// Drops the access credential from memory and from the store
    pub(crate) fn deauthorize(&self) -> Result<(), FlickrError> {
        self.replace_access_grant(None)?;
        self.store.clear()?;
        self.set_handshake(Handshake::Idle)
    }

    /// Steps one and two: obtains a request credential and returns the url the user has to
    /// visit to grant access.
    pub(crate) async fn begin_authorization(&self, callback_url: &str) -> Result<Url, FlickrError> {
        self.deauthorize()?;

        let oauth = params::oauth_params(&self.config.api_key, None).add("oauth_callback", callback_url);
        let resp = self
            .token_request(&self.config.endpoints.request_token, oauth, None)
            .await?;
        let token = read_oauth_token(&resp.body)?;
        if token.remain.get("oauth_callback_confirmed").map(String::as_str) == Some("false") {
            return Err(FlickrError::Auth("Callback was not confirmed".to_string()));
        }
        debug!("Obtained request credential");
        self.set_handshake(Handshake::RequestObtained(token.credential))?;

        // Stays in RequestCredentialObtained if the url cannot be built
        let auth_url = self.authorization_url()?;
        self.await_user_grant()?;
        Ok(auth_url)
    }

    // Url the user opens to grant access to the outstanding request token
    fn authorization_url(&self) -> Result<Url, FlickrError> {
        let request_token = match &*self.lock_handshake()? {
            Handshake::RequestObtained(c) => c.token().to_string(),
            _ => return Err(FlickrError::Auth("No request credential was obtained".to_string())),
        };
        let mut auth_url = Url::parse(&self.config.endpoints.authorize)?;
        auth_url
            .query_pairs_mut()
            .append_pair(OAUTH_TOKEN_KEY, &request_token)
            .append_pair("perms", self.config.permission.into());
        Ok(auth_url)
    }

    fn await_user_grant(&self) -> Result<(), FlickrError> {
        let mut handshake = self.lock_handshake()?;
        if let Handshake::RequestObtained(c) = std::mem::take(&mut *handshake) {
            *handshake = Handshake::AwaitingGrant(c);
        }
        Ok(())
    }

    /// Step three: exchanges the verifier for an access credential, confirms it with an
    /// identity lookup and only then commits it.
    pub(crate) async fn complete_authorization(
        &self,
        verifier: &str,
        token: &str,
    ) -> Result<AuthenticatedIdentity, FlickrError> {
        let request_credential = match &*self.lock_handshake()? {
            Handshake::AwaitingGrant(c) if c.token() == token => c.clone(),
            Handshake::AwaitingGrant(_) => {
                return Err(FlickrError::Auth(
                    "Token does not match the outstanding request token".to_string(),
                ));
            }
            _ => {
                return Err(FlickrError::Auth(
                    "No authorization is awaiting the user's grant".to_string(),
                ));
            }
        };

        let oauth = params::oauth_params(&self.config.api_key, Some(request_credential.token()))
            .add(OAUTH_VERIFIER_KEY, verifier);
        let resp = self
            .token_request(
                &self.config.endpoints.access_token,
                oauth,
                Some(request_credential.token_secret()),
            )
            .await?;
        let access = read_oauth_token(&resp.body)?;

        // Nothing is committed unless the new credential works
        let user: LoginUser = self
            .invoke_as(IDENTITY_METHOD, &ApiParams::new(), HttpVerb::Get, Some(&access.credential))
            .await?
            .extract(IDENTITY_METHOD, field("user"))?;

        let username = Some(user.username)
            .filter(|u| !u.is_empty())
            .or_else(|| access.remain.get("username").cloned());
        let grant = AccessGrant {
            credential: access.credential,
            user_id: user.id,
            username,
        };
        self.store.save(&grant)?;
        let identity = AuthenticatedIdentity {
            user_id: grant.user_id.clone(),
            username: grant.username.clone(),
        };
        self.replace_access_grant(Some(grant))?;
        self.set_handshake(Handshake::Idle)?;
        info!("Authorized as {}", identity.user_id);
        Ok(identity)
    }

    // GET against a token endpoint. These answer form encoded, not with an envelope.
    async fn token_request(
        &self,
        endpoint: &str,
        oauth: ApiParams,
        token_secret: Option<&str>,
    ) -> Result<RawResponse, FlickrError> {
        let url = Url::parse(endpoint)?;
        let signed = SignedRequest::new(HttpVerb::Get, url, oauth, &self.config.api_secret, token_secret)?;
        let resp = self.transport.execute(signed, None).await?;
        if !resp.is_success() {
            return Err(FlickrError::Auth(format!(
                "Token endpoint returned {}: {}",
                resp.status, resp.body
            )));
        }
        Ok(resp)
    }
}

/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! OAuth 1.0a HMAC-SHA1 request signing.
//!
//! The signature has to match what the service computes byte for byte, so the encoding
//! here is the strict RFC 3986 one: only `A-Z a-z 0-9 - . _ ~` pass through, everything
//! else (including space) becomes an uppercase `%XX` escape.

use crate::rest::errors::FlickrError;
use crate::rest::params::ApiParams;
use crate::rest::HttpVerb;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::borrow::Cow;
use url::Url;

pub const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";

type HmacSha1 = Hmac<Sha1>;

/// Percent encodes a key or value using the OAuth unreserved character set
pub fn percent_encode(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Scheme, host, non-default port and path of the url. Query and fragment are dropped.
pub fn base_url(url: &Url) -> String {
    let mut base = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        base.push_str(&format!(":{}", port));
    }
    base.push_str(url.path());
    base
}

/// Builds the string that gets signed.
///
/// Any query pairs already present on `url` are folded into the parameters.
pub fn signature_base_string<'a, I>(http_method: &str, url: &Url, params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut encoded: Vec<(String, String)> = params
        .into_iter()
        .filter(|(k, _)| *k != OAUTH_SIGNATURE_KEY)
        .map(|(k, v)| (percent_encode(k).into_owned(), percent_encode(v).into_owned()))
        .collect();
    encoded.extend(
        url.query_pairs()
            .map(|(k, v)| (percent_encode(&k).into_owned(), percent_encode(&v).into_owned())),
    );
    // Sorts by key then by value for repeated keys
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        http_method.to_ascii_uppercase(),
        percent_encode(&base_url(url)),
        percent_encode(&normalized)
    )
}

/// Computes the base64 HMAC-SHA1 signature for a request.
///
/// `token_secret` is `None` before any token has been issued (first handshake step).
pub fn sign<'a, I>(
    http_method: &str,
    url: &Url,
    params: I,
    consumer_secret: &str,
    token_secret: Option<&str>,
) -> Result<String, FlickrError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let base = signature_base_string(http_method, url, params);
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret.unwrap_or_default())
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| FlickrError::Auth(format!("Unable to create signing key: {}", e)))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// A request whose parameter set has been signed and is ready for the transport.
#[derive(Clone, PartialEq)]
pub struct SignedRequest {
    verb: HttpVerb,
    url: Url,
    params: ApiParams,
    signature: String,
}

impl SignedRequest {
    /// Signs `params` for a call to `url`
    pub fn new(
        verb: HttpVerb,
        url: Url,
        params: ApiParams,
        consumer_secret: &str,
        token_secret: Option<&str>,
    ) -> Result<Self, FlickrError> {
        let signature = sign(verb.into(), &url, params.iter(), consumer_secret, token_secret)?;
        Ok(Self {
            verb,
            url,
            params,
            signature,
        })
    }

    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Parameters that go on the wire, `oauth_signature` included
    pub fn into_wire_params(self) -> (HttpVerb, Url, ApiParams) {
        let mut params = self.params;
        params.insert(OAUTH_SIGNATURE_KEY, self.signature);
        (self.verb, self.url, params)
    }
}

impl std::fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedRequest")
            .field("verb", &self.verb)
            .field("url", &base_url(&self.url))
            .field("params", &self.params.len())
            .field("signature", &"xxx")
            .finish()
    }
}

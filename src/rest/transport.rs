/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::params::ApiParams;
use crate::rest::signer::{base_url, percent_encode, SignedRequest};
use bytes::Bytes;
use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use strum_macros::{EnumString, IntoStaticStr};
use url::Url;

/// HTTP verbs used by the API. Reads are `GET`, mutations and uploads are `POST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
}

/// Binary content sent as a `multipart/form-data` part.
///
/// The attachment is never part of the signed parameters.
#[derive(Clone)]
pub struct Attachment {
    pub field_name: String,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub data: Bytes,
}

impl Attachment {
    /// A photo upload part named `photo`
    pub fn photo(file_name: &str, data: impl Into<Bytes>) -> Self {
        Self {
            field_name: "photo".to_string(),
            file_name: file_name.to_string(),
            mime_type: None,
            data: data.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: &str) -> Self {
        self.mime_type = Some(mime_type.to_string());
        self
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Status and body as returned by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs the HTTP exchange for signed requests.
///
/// Failures are reported as-is; nothing is retried here.
#[derive(Debug, Clone)]
pub struct Transport {
    https_client: reqwest::Client,
}

impl Transport {
    pub fn new(proxy: Option<&str>, timeout: Option<Duration>) -> Result<Self, FlickrError> {
        let mut builder = reqwest::Client::builder();
        // Only an explicitly configured proxy is used, never one from the environment
        builder = match proxy {
            Some(proxy) => builder.proxy(
                reqwest::Proxy::all(proxy)
                    .map_err(|e| FlickrError::Config(format!("Invalid proxy '{}': {}", proxy, e)))?,
            ),
            None => builder.no_proxy(),
        };
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            https_client: builder.build()?,
        })
    }

    /// Sends the request and returns the raw response.
    ///
    /// `GET` puts the parameters in the query string. `POST` sends them form encoded, or
    /// as multipart when an attachment is present.
    pub async fn execute(
        &self,
        request: SignedRequest,
        attachment: Option<Attachment>,
    ) -> Result<RawResponse, FlickrError> {
        let (verb, mut url, params) = request.into_wire_params();
        let target = base_url(&url);

        let builder = match verb {
            HttpVerb::Get => {
                append_query(&mut url, &params);
                self.https_client.get(url)
            }
            HttpVerb::Post => {
                let builder = self.https_client.post(url);
                match attachment {
                    Some(attachment) => builder.multipart(multipart_form(params, attachment)?),
                    None => builder
                        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                        .body(encode_params(&params)),
                }
            }
        };

        let resp = builder.header(ACCEPT, "application/json").send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!("{:?} {} -> {}", verb, target, status);
        Ok(RawResponse { status, body })
    }
}

/// `k=v&k=v` using the same encoding the signature was computed with
fn encode_params(params: &ApiParams) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

// Keeps any query the endpoint was configured with; the signature covers those pairs too
fn append_query(url: &mut Url, params: &ApiParams) {
    let encoded = encode_params(params);
    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{}&{}", existing, encoded),
        _ => encoded,
    };
    url.set_query(Some(&query));
}

fn multipart_form(params: ApiParams, attachment: Attachment) -> Result<Form, FlickrError> {
    let mut form = Form::new();
    for (k, v) in params.iter() {
        form = form.text(k.to_string(), v.to_string());
    }
    let mut part = Part::bytes(attachment.data.to_vec()).file_name(attachment.file_name);
    if let Some(mime_type) = attachment.mime_type.as_deref() {
        part = part
            .mime_str(mime_type)
            .map_err(|e| FlickrError::Config(format!("Invalid mime type '{}': {}", mime_type, e)))?;
    }
    Ok(form.part(attachment.field_name, part))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rest::ErrorKind;

    #[test]
    fn params_are_strictly_encoded() {
        let params = ApiParams::new()
            .add("username", "Jane Doe & co")
            .add("format", "json");
        assert_eq!(encode_params(&params), "format=json&username=Jane%20Doe%20%26%20co");
    }

    #[test]
    fn configured_query_is_kept() {
        let params = ApiParams::new().add("method", "flickr.test.echo");
        let mut url = Url::parse("https://api.example.com/services/rest?lang=en-us").unwrap();
        append_query(&mut url, &params);
        assert_eq!(url.query(), Some("lang=en-us&method=flickr.test.echo"));

        let mut url = Url::parse("https://api.example.com/services/rest").unwrap();
        append_query(&mut url, &params);
        assert_eq!(url.query(), Some("method=flickr.test.echo"));
    }

    #[test]
    fn bad_proxy_is_a_configuration_error() {
        let err = Transport::new(Some("http://[proxy"), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(Transport::new(Some("http://proxy.example.com:3128"), None).is_ok());
    }

    #[test]
    fn bad_mime_type_is_a_configuration_error() {
        let attachment = Attachment::photo("cat.jpg", vec![1u8]).with_mime_type("no mime here");
        let err = multipart_form(ApiParams::new(), attachment).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn verbs_render_uppercase() {
        let get: &'static str = HttpVerb::Get.into();
        let post: &'static str = HttpVerb::Post.into();
        assert_eq!((get, post), ("GET", "POST"));
    }

    #[test]
    fn attachment_debug_hides_content() {
        let attachment = Attachment::photo("cat.jpg", vec![1u8, 2, 3]).with_mime_type("image/jpeg");
        let dbg = format!("{:?}", attachment);
        assert!(dbg.contains("len: 3"));
        assert!(dbg.contains("cat.jpg"));
    }
}

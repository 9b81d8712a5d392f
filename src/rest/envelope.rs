/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! Decoding of the `{"stat": "ok" | "fail", ...}` wrapper every REST response carries.

use crate::rest::errors::FlickrError;
use crate::rest::parsers::lenient_i64;
use crate::rest::ErrorCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

const STAT_KEY: &str = "stat";

/// The outer success/failure wrapper of a response
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Method specific fields of the response, `stat` removed
    Success(Value),
    /// Failure reported by the service
    Failure { code: ErrorCode, message: String },
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    /// Returns the payload, or the remote failure as a [`FlickrError::ApiResponse`]
    pub fn into_payload(self, method: &str) -> Result<Value, FlickrError> {
        match self {
            Envelope::Success(payload) => Ok(payload),
            Envelope::Failure { code, message } => Err(FlickrError::ApiResponse {
                method: method.to_string(),
                code,
                message,
            }),
        }
    }

    /// Runs `extractor` over the payload.
    ///
    /// Deserialization problems inside the extractor are reported as a malformed response
    /// for `method`.
    pub fn extract<T, F>(self, method: &str, extractor: F) -> Result<T, FlickrError>
    where
        F: FnOnce(Value) -> Result<T, FlickrError>,
    {
        let payload = self.into_payload(method)?;
        extractor(payload).map_err(|err| match err {
            FlickrError::Deserialization(e) => FlickrError::malformed(method, e.to_string()),
            FlickrError::ApiResponseMalformed(_, reason) => FlickrError::malformed(method, reason),
            other => other,
        })
    }
}

/// Parses a raw body into an [`Envelope`]
pub fn decode(raw: &str, method: &str) -> Result<Envelope, FlickrError> {
    let mut json: Value = serde_json::from_str(raw)
        .map_err(|e| FlickrError::malformed(method, format!("not JSON: {}", e)))?;
    let obj = json
        .as_object_mut()
        .ok_or_else(|| FlickrError::malformed(method, "not a JSON object"))?;

    let stat = obj.remove(STAT_KEY);
    match stat.as_ref().and_then(Value::as_str) {
        Some("ok") => Ok(Envelope::Success(json)),
        Some("fail") => {
            let code = obj
                .get("code")
                .and_then(lenient_i64)
                .map(ErrorCode::from)
                .unwrap_or(ErrorCode::Unspecified);
            let message = obj
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Ok(Envelope::Failure { code, message })
        }
        Some(other) => Err(FlickrError::malformed(
            method,
            format!("unexpected stat '{}'", other),
        )),
        None => Err(FlickrError::malformed(method, "missing stat")),
    }
}

/// Decodes and extracts in one step
pub fn decode_with<T, F>(raw: &str, method: &str, extractor: F) -> Result<T, FlickrError>
where
    F: FnOnce(Value) -> Result<T, FlickrError>,
{
    decode(raw, method)?.extract(method, extractor)
}

/// Extractor that deserializes a single top level field of the payload
pub fn field<T: DeserializeOwned>(name: &str) -> impl FnOnce(Value) -> Result<T, FlickrError> + '_ {
    move |mut payload: Value| {
        let value = payload
            .get_mut(name)
            .map(Value::take)
            .ok_or_else(|| FlickrError::malformed("", format!("missing field '{}'", name)))?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Extractor for calls whose success carries no data
pub fn unit(_: Value) -> Result<(), FlickrError> {
    Ok(())
}

// The upload endpoint answers in XML:
// <rsp stat="ok"><photoid>1234</photoid></rsp>
// <rsp stat="fail"><err code="5" msg="Filetype was not recognised"/></rsp>
#[derive(Deserialize, Debug)]
struct UploadRsp {
    #[serde(rename = "@stat")]
    stat: Option<String>,
    photoid: Option<XmlText>,
    ticketid: Option<XmlText>,
    err: Option<UploadErr>,
}

#[derive(Deserialize, Debug)]
struct XmlText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Deserialize, Debug)]
struct UploadErr {
    #[serde(rename = "@code")]
    code: Option<String>,
    #[serde(rename = "@msg", default)]
    msg: String,
}

/// Reads the upload endpoint's `<rsp>` body and returns the new photo id, or the ticket id
/// of an asynchronous upload. `stat="fail"` becomes a [`FlickrError::ApiResponse`].
pub fn decode_upload(raw: &str, method: &str) -> Result<String, FlickrError> {
    let rsp: UploadRsp = quick_xml::de::from_str(raw)
        .map_err(|e| FlickrError::malformed(method, format!("not an upload response: {}", e)))?;

    match rsp.stat.as_deref() {
        Some("ok") => rsp
            .photoid
            .or(rsp.ticketid)
            .map(|id| id.value.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| FlickrError::malformed(method, "upload succeeded without a photo id")),
        Some("fail") => {
            let (code, message) = match rsp.err {
                Some(err) => (
                    err.code
                        .and_then(|c| c.trim().parse::<i64>().ok())
                        .map(ErrorCode::from)
                        .unwrap_or(ErrorCode::Unspecified),
                    err.msg,
                ),
                None => (ErrorCode::Unspecified, String::new()),
            };
            Err(FlickrError::ApiResponse {
                method: method.to_string(),
                code,
                message,
            })
        }
        Some(other) => Err(FlickrError::malformed(
            method,
            format!("unexpected stat '{}'", other),
        )),
        None => Err(FlickrError::malformed(method, "missing stat")),
    }
}

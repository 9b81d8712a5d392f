/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::auth::Handshake;
use crate::rest::credentials::{AccessGrant, Credential, CredentialStore};
use crate::rest::envelope::{self, Envelope};
use crate::rest::errors::FlickrError;
use crate::rest::params::{self, ApiParams};
use crate::rest::signer::SignedRequest;
use crate::rest::transport::{Attachment, HttpVerb, RawResponse, Transport};
use crate::rest::ClientConfig;
use log::{debug, warn};
use num_enum::FromPrimitive;
use std::sync::{Arc, Mutex, RwLock};

// Root Flickr endpoints
pub const REST_ENDPOINT: &str = "https://api.flickr.com/services/rest";
pub const UPLOAD_ENDPOINT: &str = "https://up.flickr.com/services/upload/";
pub const REQUEST_TOKEN_ENDPOINT: &str = "https://www.flickr.com/services/oauth/request_token";
pub const AUTHORIZE_ENDPOINT: &str = "https://www.flickr.com/services/oauth/authorize";
pub const ACCESS_TOKEN_ENDPOINT: &str = "https://www.flickr.com/services/oauth/access_token";

// Name used for upload failures, which have no REST method
const UPLOAD_METHOD: &str = "upload";

/// Error codes per the Flickr API docs.
///
/// Code 1 is method specific but always means the looked up object does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(i64)]
pub enum ErrorCode {
    /// The failure response carried no code
    Unspecified = 0,
    NotFound = 1,
    SslRequired = 95,
    InvalidSignature = 96,
    MissingSignature = 97,
    LoginFailed = 98,
    InsufficientPermissions = 99,
    InvalidApiKey = 100,
    ServiceUnavailable = 105,
    WriteOperationFailed = 106,
    FormatNotFound = 111,
    MethodNotFound = 112,
    InvalidSoapEnvelope = 114,
    InvalidXmlRpcCall = 115,
    BadUrlFound = 116,
    #[num_enum(catch_all)]
    Unknown(i64),
}

impl ErrorCode {
    pub fn code(&self) -> i64 {
        use ErrorCode as E;
        match *self {
            E::Unspecified => 0,
            E::NotFound => 1,
            E::SslRequired => 95,
            E::InvalidSignature => 96,
            E::MissingSignature => 97,
            E::LoginFailed => 98,
            E::InsufficientPermissions => 99,
            E::InvalidApiKey => 100,
            E::ServiceUnavailable => 105,
            E::WriteOperationFailed => 106,
            E::FormatNotFound => 111,
            E::MethodNotFound => 112,
            E::InvalidSoapEnvelope => 114,
            E::InvalidXmlRpcCall => 115,
            E::BadUrlFound => 116,
            E::Unknown(code) => code,
        }
    }

    /// Codes 95 to 100, used when the service rejects the request's credentials or security
    pub fn is_authorization_failure(&self) -> bool {
        use ErrorCode as E;
        matches!(
            self,
            E::SslRequired
                | E::InvalidSignature
                | E::MissingSignature
                | E::LoginFailed
                | E::InsufficientPermissions
                | E::InvalidApiKey
        )
    }
}

/// Directly communicates with the API.
///
/// Owns the signing secrets, the transport and the current access grant. The grant is
/// swapped as a whole; in-flight calls keep using the one they started with.
pub struct ApiClient {
    pub(crate) config: ClientConfig,
    pub(crate) transport: Transport,
    pub(crate) store: Arc<dyn CredentialStore>,
    access: RwLock<Option<Arc<AccessGrant>>>,
    pub(crate) handshake: Mutex<Handshake>,
}

impl ApiClient {
    pub(crate) fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, FlickrError> {
        let transport = Transport::new(config.proxy.as_deref(), config.timeout)?;
        let access = store.load()?.filter(|g| !g.credential.is_empty()).map(Arc::new);
        if access.is_some() {
            debug!("Loaded stored access credential");
        }
        Ok(Self {
            config,
            transport,
            store,
            access: RwLock::new(access),
            handshake: Mutex::new(Handshake::Idle),
        })
    }

    /// Snapshot of the current access grant
    pub(crate) fn access_grant(&self) -> Result<Option<Arc<AccessGrant>>, FlickrError> {
        Ok(self.access.read().map_err(lock_poisoned)?.clone())
    }

    pub(crate) fn replace_access_grant(&self, grant: Option<AccessGrant>) -> Result<(), FlickrError> {
        *self.access.write().map_err(lock_poisoned)? = grant.map(Arc::new);
        Ok(())
    }

    /// Calls `method` signed with the current access credential, if any
    pub async fn invoke(
        &self,
        method: &str,
        params: &ApiParams,
        verb: HttpVerb,
    ) -> Result<Envelope, FlickrError> {
        let grant = self.access_grant()?;
        self.invoke_as(method, params, verb, grant.as_ref().map(|g| &g.credential))
            .await
    }

    /// Calls `method` signed with the given credential
    pub(crate) async fn invoke_as(
        &self,
        method: &str,
        params: &ApiParams,
        verb: HttpVerb,
        credential: Option<&Credential>,
    ) -> Result<Envelope, FlickrError> {
        let url = url::Url::parse(&self.config.endpoints.rest)?;
        let params = params::api_call_params(
            method,
            &self.config.api_key,
            credential.map(Credential::token),
            params,
        );
        let signed = SignedRequest::new(
            verb,
            url,
            params,
            &self.config.api_secret,
            credential.map(Credential::token_secret),
        )?;

        debug!("Invoking {} ({:?})", method, verb);
        let resp = self.transport.execute(signed, None).await?;
        let envelope = classify(resp, method)?;
        if let Envelope::Failure { code, message } = &envelope {
            warn!("{} failed with {:?}: {}", method, code, message);
        }
        Ok(envelope)
    }

    /// Posts `attachment` as multipart to the upload endpoint and returns the new photo id
    pub async fn upload(&self, attachment: Attachment, params: &ApiParams) -> Result<String, FlickrError> {
        let grant = self
            .access_grant()?
            .ok_or_else(|| FlickrError::Auth("Upload requires an authorized client".to_string()))?;
        let url = url::Url::parse(&self.config.endpoints.upload)?;
        let mut all = params::oauth_params(&self.config.api_key, Some(grant.credential.token()));
        all.merge(params);
        let signed = SignedRequest::new(
            HttpVerb::Post,
            url,
            all,
            &self.config.api_secret,
            Some(grant.credential.token_secret()),
        )?;

        debug!("Uploading {:?}", attachment);
        let resp = self.transport.execute(signed, Some(attachment)).await?;
        match envelope::decode_upload(&resp.body, UPLOAD_METHOD) {
            Err(_) if !resp.is_success() => Err(FlickrError::HttpStatus(resp.status, resp.body)),
            Err(err) => {
                warn!("Upload failed: {}", err);
                Err(err)
            }
            photo_id => photo_id,
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish()
    }
}

fn lock_poisoned<T>(_: T) -> FlickrError {
    FlickrError::Auth("credential lock poisoned".to_string())
}

// A body that is not an envelope on an error status is a transport level failure
fn classify(resp: RawResponse, method: &str) -> Result<Envelope, FlickrError> {
    match envelope::decode(&resp.body, method) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !resp.is_success() => Err(FlickrError::HttpStatus(resp.status, resp.body)),
        Err(err) => Err(err),
    }
}

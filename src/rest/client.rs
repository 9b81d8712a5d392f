/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::api::{
    ApiClient, ACCESS_TOKEN_ENDPOINT, AUTHORIZE_ENDPOINT, REQUEST_TOKEN_ENDPOINT, REST_ENDPOINT,
    UPLOAD_ENDPOINT,
};
use crate::rest::auth::{parse_callback, AuthState, AuthenticatedIdentity};
use crate::rest::credentials::{CredentialStore, MemoryCredentialStore};
use crate::rest::envelope::Envelope;
use crate::rest::errors::FlickrError;
use crate::rest::pagination::{page_of, Paginated};
use crate::rest::params::ApiParams;
use crate::rest::people::{self, UserInfo};
use crate::rest::transport::{Attachment, HttpVerb};
use async_stream::try_stream;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use strum_macros::{EnumString, IntoStaticStr};
use url::Url;

/// Access level requested from the user during authorization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Permission {
    #[default]
    Read,
    Write,
    Delete,
}

/// Urls of the service. Overridable so the client can be pointed at another host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub rest: String,
    pub upload: String,
    pub request_token: String,
    pub authorize: String,
    pub access_token: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            rest: REST_ENDPOINT.to_string(),
            upload: UPLOAD_ENDPOINT.to_string(),
            request_token: REQUEST_TOKEN_ENDPOINT.to_string(),
            authorize: AUTHORIZE_ENDPOINT.to_string(),
            access_token: ACCESS_TOKEN_ENDPOINT.to_string(),
        }
    }
}

impl Endpoints {
    /// Every endpoint under a single origin, using the service's paths
    pub fn rooted_at(origin: &str) -> Result<Self, FlickrError> {
        let origin = Url::parse(origin)?;
        let at = |path: &str| -> Result<String, FlickrError> { Ok(origin.join(path)?.to_string()) };
        Ok(Self {
            rest: at("/services/rest")?,
            upload: at("/services/upload/")?,
            request_token: at("/services/oauth/request_token")?,
            authorize: at("/services/oauth/authorize")?,
            access_token: at("/services/oauth/access_token")?,
        })
    }
}

/// Settings for a [`Client`]
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) api_key: String,
    pub(crate) api_secret: String,
    pub(crate) permission: Permission,
    pub(crate) proxy: Option<String>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) endpoints: Endpoints,
}

impl ClientConfig {
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            permission: Permission::default(),
            proxy: None,
            timeout: None,
            endpoints: Endpoints::default(),
        }
    }

    pub fn permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    /// Proxy url used for every request, e.g. `http://proxy:3128`
    pub fn proxy(mut self, proxy: &str) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Deadline for a whole request
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"xxx")
            .field("api_secret", &"xxx")
            .field("permission", &self.permission)
            .field("proxy", &self.proxy.as_ref().map(|_| "xxx"))
            .field("timeout", &self.timeout)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Handle to the Flickr API. Cheap to clone; clones share credentials.
///
/// ```no_run
/// use flickr::rest::{people, Client, ClientConfig, FileCredentialStore};
/// use std::sync::Arc;
///
/// async fn show_photos() -> Result<(), flickr::rest::FlickrError> {
///     let store = Arc::new(FileCredentialStore::new("flickr-auth.json"));
///     let client = Client::new(ClientConfig::new("api-key", "api-secret"), store)?;
///
///     if client.is_first_start()? {
///         let url = client.begin_authorization("http://localhost/callback").await?;
///         println!("Grant access at {}", url);
///         // ... user is redirected back to the callback url
///         client
///             .complete_authorization_from_callback("http://localhost/callback?oauth_token=t&oauth_verifier=v")
///             .await?;
///     }
///
///     let user_id = client.user_id()?.unwrap_or_default();
///     let photos = people::photos(&client, &user_id, 50, 1).await?;
///     println!("{} of {} photos", photos.len(), photos.total_items());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    api_client: Arc<ApiClient>,
}

impl Client {
    /// Creates a client. A grant already present in `store` makes it authorized right away.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, FlickrError> {
        Ok(Self {
            api_client: Arc::new(ApiClient::new(config, store)?),
        })
    }

    /// A client whose credential only lives as long as the process
    pub fn in_memory(config: ClientConfig) -> Result<Self, FlickrError> {
        Self::new(config, Arc::new(MemoryCredentialStore::new()))
    }

    /// Calls a remote method and returns its envelope as is
    pub async fn invoke(
        &self,
        method: &str,
        params: &ApiParams,
        verb: HttpVerb,
    ) -> Result<Envelope, FlickrError> {
        self.api_client.invoke(method, params, verb).await
    }

    /// `GET` call whose payload is handed to `extractor`. Remote failures become errors.
    pub async fn get<T, F>(&self, method: &str, params: &ApiParams, extractor: F) -> Result<T, FlickrError>
    where
        F: FnOnce(Value) -> Result<T, FlickrError>,
    {
        self.invoke(method, params, HttpVerb::Get)
            .await?
            .extract(method, extractor)
    }

    /// `POST` counterpart of [`Client::get`], used for calls that change data
    pub async fn post<T, F>(&self, method: &str, params: &ApiParams, extractor: F) -> Result<T, FlickrError>
    where
        F: FnOnce(Value) -> Result<T, FlickrError>,
    {
        self.invoke(method, params, HttpVerb::Post)
            .await?
            .extract(method, extractor)
    }

    /// Uploads binary content and returns the id of the new photo (the ticket id when the
    /// upload is asynchronous). A `stat="fail"` answer is returned as an error.
    pub async fn upload(&self, attachment: Attachment, params: &ApiParams) -> Result<String, FlickrError> {
        self.api_client.upload(attachment, params).await
    }

    /// Streams the items of every page of a paginated method.
    ///
    /// Each page is a new call with `page` incremented until the last page is reached.
    pub fn paginate_all<T>(
        &self,
        method: &str,
        params: ApiParams,
        list_key: &str,
        items_key: &str,
    ) -> impl Stream<Item = Result<T, FlickrError>> + use<T>
    where
        T: DeserializeOwned,
    {
        let client = self.clone();
        let method = method.to_string();
        let list_key = list_key.to_string();
        let items_key = items_key.to_string();

        try_stream! {
            let mut page_num: u32 = 1;
            loop {
                let params = params.clone().add("page", page_num);
                let page: Paginated<T> = client
                    .get(&method, &params, page_of(&list_key, &items_key))
                    .await?;
                let next = page.next_page();
                for item in page {
                    yield item;
                }
                match next {
                    Some(n) if n > page_num => page_num = n,
                    _ => break,
                }
            }
        }
    }

    pub fn auth_state(&self) -> Result<AuthState, FlickrError> {
        self.api_client.auth_state()
    }

    pub fn is_authorized(&self) -> Result<bool, FlickrError> {
        Ok(self.auth_state()? == AuthState::Authorized)
    }

    /// True until an access credential has been obtained or loaded
    pub fn is_first_start(&self) -> Result<bool, FlickrError> {
        Ok(!self.is_authorized()?)
    }

    /// Starts (or restarts) authorization and returns the url the user must open.
    ///
    /// Any existing access credential is discarded first.
    pub async fn begin_authorization(&self, callback_url: &str) -> Result<Url, FlickrError> {
        self.api_client.begin_authorization(callback_url).await
    }

    /// Completes authorization with the `oauth_verifier` and `oauth_token` from the callback
    pub async fn complete_authorization(
        &self,
        verifier: &str,
        token: &str,
    ) -> Result<AuthenticatedIdentity, FlickrError> {
        self.api_client.complete_authorization(verifier, token).await
    }

    /// Same as [`Client::complete_authorization`] reading both values from the callback url
    pub async fn complete_authorization_from_callback(
        &self,
        callback_url: &str,
    ) -> Result<AuthenticatedIdentity, FlickrError> {
        let (verifier, token) = parse_callback(callback_url)?;
        self.complete_authorization(&verifier, &token).await
    }

    /// Forgets the access credential, in memory and in the store
    pub fn deauthorize(&self) -> Result<(), FlickrError> {
        self.api_client.deauthorize()
    }

    /// Id of the user the access credential was confirmed for
    pub fn user_id(&self) -> Result<Option<String>, FlickrError> {
        Ok(self.api_client.access_grant()?.map(|g| g.user_id.clone()))
    }

    /// Profile of the authorized user, `None` before authorization.
    ///
    /// Every failure of the lookup, "not found" included, is returned as an error.
    pub async fn user(&self) -> Result<Option<UserInfo>, FlickrError> {
        match self.user_id()? {
            Some(user_id) => people::user_info(self, &user_id).await.map(Some),
            None => Ok(None),
        }
    }
}

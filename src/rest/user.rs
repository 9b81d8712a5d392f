/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::parsers::{from_content, from_content_to_none, from_flag};
use serde::Deserialize;
use std::hash::{Hash, Hasher};

/// Holds information returned from the people lookup methods.
///
/// See [Flickr API Docs](https://www.flickr.com/services/api/flickr.people.findByUsername.html)
#[derive(Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,

    #[serde(deserialize_with = "from_content")]
    pub username: String,
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "username: {}, id: {}", self.username, self.id)
    }
}

/// Holds information returned from `flickr.people.getInfo`.
#[derive(Deserialize, Debug, Clone)]
pub struct UserInfo {
    pub id: String,

    #[serde(deserialize_with = "from_content")]
    pub username: String,

    #[serde(default, rename = "realname", deserialize_with = "from_content_to_none")]
    pub real_name: Option<String>,

    #[serde(default, deserialize_with = "from_content_to_none")]
    pub location: Option<String>,

    #[serde(default, rename = "photosurl", deserialize_with = "from_content_to_none")]
    pub photos_url: Option<String>,

    #[serde(default, rename = "profileurl", deserialize_with = "from_content_to_none")]
    pub profile_url: Option<String>,

    #[serde(default, rename = "ispro", deserialize_with = "from_flag")]
    pub is_pro: bool,
}

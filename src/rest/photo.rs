/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::parsers::{from_flag, from_int_or_str};
use serde::Deserialize;

/// A photo as it appears in list results.
///
/// See [Flickr API Docs](https://www.flickr.com/services/api/flickr.people.getPhotos.html)
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: String,

    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub secret: String,

    #[serde(default)]
    pub server: String,

    #[serde(default, deserialize_with = "from_int_or_str")]
    pub farm: u64,

    #[serde(default)]
    pub title: String,

    #[serde(default, rename = "ispublic", deserialize_with = "from_flag")]
    pub is_public: bool,

    #[serde(default, rename = "isfriend", deserialize_with = "from_flag")]
    pub is_friend: bool,

    #[serde(default, rename = "isfamily", deserialize_with = "from_flag")]
    pub is_family: bool,
}

impl std::fmt::Display for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "title: {}, id: {}", self.title, self.id)
    }
}

/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! `flickr.people.*` calls.
//!
//! The lookups by email and username return `None` when the service answers with its
//! "user not found" code; every other failure is returned as is.

use crate::rest::envelope::field;
use crate::rest::errors::{FlickrError, NotFoundExt};
use crate::rest::pagination::{page_of, Paginated};
use crate::rest::params::ApiParams;
use crate::rest::{Client, Photo};

pub use crate::rest::user::{User, UserInfo};

/// Finds a user by primary or secondary email address
pub async fn find_by_email(client: &Client, email: &str) -> Result<Option<User>, FlickrError> {
    let params = ApiParams::new().add("find_email", email);
    client
        .get::<User, _>("flickr.people.findByEmail", &params, field("user"))
        .await
        .not_found_as_none()
}

/// Finds a user by username
pub async fn find_by_username(client: &Client, username: &str) -> Result<Option<User>, FlickrError> {
    let params = ApiParams::new().add("username", username);
    client
        .get::<User, _>("flickr.people.findByUsername", &params, field("user"))
        .await
        .not_found_as_none()
}

pub async fn user_info(client: &Client, user_id: &str) -> Result<UserInfo, FlickrError> {
    let params = ApiParams::new().add("user_id", user_id);
    client.get("flickr.people.getInfo", &params, field("person")).await
}

/// Photos from the user's photostream visible to the calling user
pub async fn photos(
    client: &Client,
    user_id: &str,
    per_page: u32,
    page: u32,
) -> Result<Paginated<Photo>, FlickrError> {
    photo_page(client, "flickr.people.getPhotos", user_id, per_page, page).await
}

/// Public photos of the user
pub async fn public_photos(
    client: &Client,
    user_id: &str,
    per_page: u32,
    page: u32,
) -> Result<Paginated<Photo>, FlickrError> {
    photo_page(client, "flickr.people.getPublicPhotos", user_id, per_page, page).await
}

async fn photo_page(
    client: &Client,
    method: &str,
    user_id: &str,
    per_page: u32,
    page: u32,
) -> Result<Paginated<Photo>, FlickrError> {
    let params = ApiParams::new()
        .add("user_id", user_id)
        .add("per_page", per_page)
        .add("page", page);
    client.get(method, &params, page_of("photos", "photo")).await
}

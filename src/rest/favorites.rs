/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! `flickr.favorites.*` calls

use crate::rest::envelope::unit;
use crate::rest::errors::FlickrError;
use crate::rest::pagination::{page_of, Paginated};
use crate::rest::params::ApiParams;
use crate::rest::{Client, Photo};

/// The user's favorite photos that the calling user may see
pub async fn list(
    client: &Client,
    user_id: &str,
    per_page: u32,
    page: u32,
) -> Result<Paginated<Photo>, FlickrError> {
    favorites_page(client, "flickr.favorites.getList", user_id, per_page, page).await
}

/// The user's public favorites
pub async fn public_list(
    client: &Client,
    user_id: &str,
    per_page: u32,
    page: u32,
) -> Result<Paginated<Photo>, FlickrError> {
    favorites_page(client, "flickr.favorites.getPublicList", user_id, per_page, page).await
}

pub async fn add(client: &Client, photo_id: &str) -> Result<(), FlickrError> {
    let params = ApiParams::new().add("photo_id", photo_id);
    client.post("flickr.favorites.add", &params, unit).await
}

pub async fn remove(client: &Client, photo_id: &str) -> Result<(), FlickrError> {
    let params = ApiParams::new().add("photo_id", photo_id);
    client.post("flickr.favorites.remove", &params, unit).await
}

async fn favorites_page(
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

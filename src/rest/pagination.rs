/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::parsers::lenient_u64;
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One page of a multi-item result.
///
/// Holds only what the service returned; fetching the following page means calling the
/// originating method again with [`Paginated::next_page`].
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    items: Vec<T>,
    page: u32,
    per_page: u32,
    total_pages: u32,
    total_items: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total_pages: u32, total_items: u64) -> Self {
        Self {
            items,
            page,
            per_page,
            total_pages,
            total_items,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    /// Page number to request next, if there is one
    pub fn next_page(&self) -> Option<u32> {
        self.has_next_page().then(|| self.page + 1)
    }

    /// Converts the items, keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
            total_items: self.total_items,
        }
    }
}

impl<T> IntoIterator for Paginated<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Paginated<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Builds a page from a list-bearing object such as
/// `{"page": 2, "pages": 5, "perpage": 50, "total": 230, "photo": [...]}`.
///
/// Scalars may be numbers or numeric strings. Missing `pages`/`total` read as 0 and the
/// items are still returned.
pub fn paginate<T: DeserializeOwned>(payload: &Value, items_key: &str) -> Result<Paginated<T>, FlickrError> {
    paginate_with(payload, items_key, |item| Ok(serde_json::from_value(item.clone())?))
}

/// Same as [`paginate`] with a caller supplied item parser
pub fn paginate_with<T, F>(payload: &Value, items_key: &str, mut parse_item: F) -> Result<Paginated<T>, FlickrError>
where
    F: FnMut(&Value) -> Result<T, FlickrError>,
{
    let obj = payload
        .as_object()
        .ok_or_else(|| FlickrError::malformed("", "paginated payload is not an object"))?;

    let items = match obj.get(items_key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(list)) => list.iter().map(&mut parse_item).collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(FlickrError::malformed(
                "",
                format!("'{}' is not a list", items_key),
            ));
        }
    };

    let scalar = |keys: &[&str]| keys.iter().find_map(|k| obj.get(*k).and_then(lenient_u64));
    let total_pages = scalar(&["pages"]).unwrap_or(0) as u32;
    let total_items = scalar(&["total"]).unwrap_or(0);
    let page = scalar(&["page"])
        .map(|p| p as u32)
        .unwrap_or(if items.is_empty() { 0 } else { 1 });
    let per_page = scalar(&["perpage", "per_page"])
        .map(|p| p as u32)
        .unwrap_or(items.len() as u32);

    if items.len() > per_page as usize {
        warn!("Page holds {} items but perpage is {}", items.len(), per_page);
    }
    if total_items > 0 && total_pages > 0 && page > total_pages {
        warn!("Page {} is past the last page {}", page, total_pages);
    }

    Ok(Paginated::new(items, page, per_page, total_pages, total_items))
}

/// Extractor for payloads shaped `{list_key: {page.., items_key: [...]}}`
pub fn page_of<'a, T: DeserializeOwned>(
    list_key: &'a str,
    items_key: &'a str,
) -> impl FnOnce(Value) -> Result<Paginated<T>, FlickrError> + 'a {
    move |payload: Value| {
        let list = payload
            .get(list_key)
            .ok_or_else(|| FlickrError::malformed("", format!("missing field '{}'", list_key)))?;
        paginate(list, items_key)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Item {
        id: String,
    }

    fn items(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({"id": i.to_string()})).collect()
    }

    #[test]
    fn reads_page_metadata() {
        let payload = json!({"page": 2, "pages": 5, "perpage": 50, "total": 230, "photo": items(50)});
        let page: Paginated<Item> = paginate(&payload, "photo").unwrap();
        assert_eq!(page.page(), 2);
        assert_eq!(page.total_pages(), 5);
        assert_eq!(page.per_page(), 50);
        assert_eq!(page.total_items(), 230);
        assert_eq!(page.len(), 50);
        assert_eq!(page.items()[49], Item { id: "49".to_string() });
        assert_eq!(page.next_page(), Some(3));
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let payload = json!({"page": "5", "pages": "5", "perpage": "2", "total": "9", "photo": items(1)});
        let page: Paginated<Item> = paginate(&payload, "photo").unwrap();
        assert_eq!((page.page(), page.total_pages(), page.per_page(), page.total_items()), (5, 5, 2, 9));
        assert!(!page.has_next_page());
        assert_eq!(page.next_page(), None);
    }

    #[test]
    fn missing_totals_keep_items() {
        let payload = json!({"page": 1, "perpage": 50, "photo": items(3)});
        let page: Paginated<Item> = paginate(&payload, "photo").unwrap();
        assert_eq!(page.total_pages(), 0);
        assert_eq!(page.total_items(), 0);
        assert_eq!(page.len(), 3);
    }

    #[test]
    fn missing_everything_but_items() {
        let payload = json!({"group": items(4)});
        let page: Paginated<Item> = paginate(&payload, "group").unwrap();
        assert_eq!(page.page(), 1);
        assert_eq!(page.per_page(), 4);
        assert_eq!(page.len(), 4);
    }

    #[test]
    fn missing_items_is_empty_page() {
        let payload = json!({"page": 1, "pages": 0, "perpage": 50, "total": 0});
        let page: Paginated<Item> = paginate(&payload, "photo").unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn bad_items_are_malformed() {
        let payload = json!({"photo": {"id": "1"}});
        assert!(paginate::<Item>(&payload, "photo").is_err());
        let payload = json!({"photo": [{"nope": 1}]});
        assert!(paginate::<Item>(&payload, "photo").is_err());
    }

    #[test]
    fn nested_list_extractor() {
        let payload = json!({"photos": {"page": 1, "pages": 1, "perpage": 10, "total": 2, "photo": items(2)}});
        let page: Paginated<Item> = page_of("photos", "photo")(payload).unwrap();
        let ids: Vec<String> = page.map(|i| i.id).into_items();
        assert_eq!(ids, vec!["0", "1"]);
    }
}

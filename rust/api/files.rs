use url::Url;

use crate::models::StorageRef;

const VIEW_PATH: &str = "files/view";

/// `<base>/files/view?url=<encoded reference>`
///
/// References may point at non-public storage and are never linked directly.
pub fn view_url(file_base: &Url, reference: &StorageRef) -> Url {
    let mut url = file_base
        .join(VIEW_PATH)
        .unwrap_or_else(|_| file_base.clone());
    url.query_pairs_mut()
        .clear()
        .append_pair("url", reference.reference());
    url
}

/// View link for an optional attachment; blank references yield nothing.
pub fn attachment_link(file_base: &Url, reference: Option<&StorageRef>) -> Option<Url> {
    reference
        .filter(|r| !r.is_empty())
        .map(|r| view_url(file_base, r))
}

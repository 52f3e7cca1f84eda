//! WordPress REST records used across harnesses.

use serde_json::{json, Value};

/// A post or page record as `/wp/v2/posts` returns it (trimmed).
pub fn post(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "slug": title.to_lowercase().replace(' ', "-"),
        "status": "publish",
        "type": "post",
        "title": { "rendered": title },
    })
}

/// A term record as `/wp/v2/categories` returns it (trimmed).
pub fn term(id: u64, name: &str, taxonomy: &str) -> Value {
    json!({
        "id": id,
        "count": 1,
        "name": name,
        "slug": name.to_lowercase().replace(' ', "-"),
        "taxonomy": taxonomy,
    })
}

pub fn sample_posts() -> Vec<Value> {
    vec![
        post(1, "Hello world"),
        post(2, "Cats of the internet"),
        post(3, "Caring for your cat"),
        post(4, "Release notes 1.2"),
        post(5, "Rock & roll"),
    ]
}

pub fn sample_categories() -> Vec<Value> {
    vec![
        term(10, "News", "category"),
        term(11, "Newsletters", "category"),
        term(12, "Reviews", "category"),
        term(13, "Uncategorized", "category"),
    ]
}

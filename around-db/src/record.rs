use crate::store::StoredDocument;
use around_common::model::post::Post;
use serde::Deserialize;
use serde_json::{Value, json};

pub const POST_INDEX: &str = "around";
pub const POST_DOC_TYPE: &str = "post";
pub const LOCATION_FIELD: &str = "location";

/// Index mapping declaring the location field as a geo point.
#[must_use]
pub fn post_index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                LOCATION_FIELD: { "type": "geo_point" }
            }
        }
    })
}

pub(crate) fn post_document(post: &Post) -> Result<Value, serde_json::Error> {
    serde_json::to_value(post)
}

/// Decodes a hit's source into a post. Range checks on the location apply here too.
pub(crate) fn decode_post(document: &StoredDocument) -> Result<Post, serde_json::Error> {
    Post::deserialize(&document.source)
}

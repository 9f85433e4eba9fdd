use super::{COL_DESCRIPTION, COL_LANGUAGE, COL_NAME, COL_STARRED, COL_URL};
use crate::StarredRepo;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct QueryDatabase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    pub page_size: u8,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct CreatePage {
    pub parent: Parent,
    pub properties: Map<String, Value>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct Parent {
    pub database_id: String,
}

#[derive(Serialize, Deserialize, Default, PartialEq, Clone, Debug)]
pub struct UpdatePage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

/// Map a starred repository onto the table's columns.
pub fn star_properties(star: &StarredRepo) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(COL_NAME.to_owned(), title_prop(&star.id.to_string()));
    props.insert(COL_URL.to_owned(), json!({ "url": star.url }));
    if let Some(description) = &star.description {
        props.insert(COL_DESCRIPTION.to_owned(), rich_text_prop(description));
    }
    if let Some(language) = &star.language {
        props.insert(COL_LANGUAGE.to_owned(), json!({ "select": { "name": language } }));
    }
    props.insert(
        COL_STARRED.to_owned(),
        json!({ "date": { "start": star.starred_at.to_rfc3339() } }),
    );
    props
}

fn title_prop(text: &str) -> Value {
    json!({ "title": [{ "text": { "content": text } }] })
}

pub fn rich_text_prop(text: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": text } }] })
}

use super::{COL_DESCRIPTION, COL_NAME, COL_URL};
use crate::{RepoId, TableRow};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct QueryDatabaseResponse {
    pub results: Vec<Page>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

/// A property value of a page. Only the variants the table maps are modeled;
/// other property types deserialize to an empty value.
#[derive(Deserialize, Default, PartialEq, Clone, Debug)]
pub struct PropertyValue {
    #[serde(default)]
    pub title: Option<Vec<RichText>>,
    #[serde(default)]
    pub rich_text: Option<Vec<RichText>>,
    #[serde(default)]
    pub url: Option<String>,
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<String> {
        let spans = self.title.as_ref().or(self.rich_text.as_ref())?;
        Some(spans.iter().map(|x| x.plain_text.as_str()).collect())
    }
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct RichText {
    pub plain_text: String,
}

impl From<Page> for TableRow {
    fn from(page: Page) -> Self {
        let title = page.properties.get(COL_NAME).and_then(PropertyValue::as_text);
        let repo = title.as_deref().and_then(|x| x.parse::<RepoId>().ok());
        let url = page.properties.get(COL_URL).and_then(|x| x.url.clone());
        let description = page
            .properties
            .get(COL_DESCRIPTION)
            .and_then(PropertyValue::as_text)
            .filter(|x| !x.is_empty());
        Self { page_id: page.id, repo, url, description }
    }
}

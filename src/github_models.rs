use crate::{RepoId, StarredRepo};
use anyhow::Error;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One entry of the starred listing, as returned with
/// `Accept: application/vnd.github.star+json`.
#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct GhStar {
    pub starred_at: DateTime<Utc>,
    pub repo: GhRepo,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct GhRepo {
    pub id: u64,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
}

impl TryFrom<GhStar> for StarredRepo {
    type Error = Error;

    fn try_from(star: GhStar) -> Result<Self, Self::Error> {
        let GhStar { starred_at, repo } = star;
        let id: RepoId = repo.full_name.parse()?;
        let s = Self {
            id,
            url: repo.html_url,
            description: repo.description.filter(|x| !x.is_empty()),
            language: repo.language,
            starred_at,
        };
        Ok(s)
    }
}

pub mod app;
pub mod config;
pub mod github_client;
pub mod github_models;
pub mod notion;

use anyhow::{bail, Error};
use chrono::{DateTime, Utc};
use core::fmt;
use std::str::FromStr;

/// Repository identity, its full name.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self { owner, name }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sep = s.find('/');
        let r = match sep {
            Some(x) => {
                let owner = &s[..x];
                let name = &s[x + 1..];
                if owner.is_empty() || name.is_empty() {
                    bail!("Expecting a full name in `owner/name` format, but was `{}`.", s)
                }
                Self { owner: owner.to_owned(), name: name.to_owned() }
            }
            None => {
                bail!("Expecting a full name in `owner/name` format, but was `{}`.", s)
            }
        };
        Ok(r)
    }
}

#[cfg(test)]
#[test]
fn test_repo_id_display() {
    assert_eq!(RepoId::new("kafji", "shub").to_string(), "kafji/shub");
}

#[cfg(test)]
#[test]
fn test_parse_repo_id() {
    // trivial case
    assert_eq!(RepoId::new("kafji", "shub"), "kafji/shub".parse().unwrap());
    // missing owner
    assert_eq!(
        "Expecting a full name in `owner/name` format, but was `/shub`.",
        "/shub".parse::<RepoId>().unwrap_err().to_string()
    );
    // missing name
    assert_eq!(
        "Expecting a full name in `owner/name` format, but was `kafji/`.",
        "kafji/".parse::<RepoId>().unwrap_err().to_string()
    );
    // missing separator
    assert_eq!(
        "Expecting a full name in `owner/name` format, but was `shub`.",
        "shub".parse::<RepoId>().unwrap_err().to_string()
    );
    // double separator
    assert_eq!(RepoId::new("kafji", "sh/ub"), "kafji/sh/ub".parse().unwrap());
}

/// A repository starred by the configured user. Snapshot taken once per run.
#[derive(PartialEq, Clone, Debug)]
pub struct StarredRepo {
    pub id: RepoId,
    pub url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub starred_at: DateTime<Utc>,
}

/// A row of the target Notion table.
///
/// `repo` is `None` when the title column is empty or does not hold a
/// repository full name. Such rows are never touched.
#[derive(PartialEq, Clone, Debug)]
pub struct TableRow {
    pub page_id: String,
    pub repo: Option<RepoId>,
    pub url: Option<String>,
    pub description: Option<String>,
}

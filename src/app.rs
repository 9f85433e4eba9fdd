use crate::{
    config::Config,
    github_client::GithubClientImpl,
    notion::{self, NotionClientImpl},
    RepoId, StarredRepo, TableRow,
};
use anyhow::Error;
use async_trait::async_trait;
use core::fmt;
use futures::{stream::LocalBoxStream, TryStreamExt};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

pub trait GithubClient {
    fn list_starred<'a>(
        &'a self,
        username: &'a str,
    ) -> LocalBoxStream<'a, Result<StarredRepo, Error>>;
}

#[async_trait]
pub trait NotionClient {
    fn list_rows<'a>(
        &'a self,
        database_id: &'a str,
    ) -> LocalBoxStream<'a, Result<TableRow, Error>>;

    async fn create_row(&self, database_id: &str, star: &StarredRepo) -> Result<(), Error>;

    async fn set_description(&self, page_id: &str, description: &str) -> Result<(), Error>;

    async fn archive_row(&self, page_id: &str) -> Result<(), Error>;
}

#[derive(Default, PartialEq, Copy, Clone, Debug)]
pub struct SyncOptions {
    /// Archive rows whose repository is no longer starred.
    pub prune: bool,
    /// Compute the plan but write nothing.
    pub dry_run: bool,
}

#[derive(Default, PartialEq, Copy, Clone, Debug)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} updated={} deleted={}",
            self.created, self.updated, self.deleted
        )
    }
}

/// What a run would write, computed before any write happens.
#[derive(PartialEq, Clone, Debug)]
pub struct SyncPlan<'a> {
    /// Stars without a row. Exactly `starred - existing` by identity.
    pub create: Vec<&'a StarredRepo>,
    /// Rows with an empty description where the star has one.
    pub fill_description: Vec<(&'a TableRow, &'a str)>,
    /// Rows whose repository is no longer starred.
    pub prune: Vec<&'a TableRow>,
}

impl<'a> SyncPlan<'a> {
    pub fn compute(stars: &'a [StarredRepo], rows: &'a [TableRow]) -> Self {
        let rows_by_id: HashMap<&RepoId, &TableRow> = rows
            .iter()
            .filter_map(|row| row.repo.as_ref().map(|id| (id, row)))
            .collect();
        let stars_by_id: HashMap<&RepoId, &StarredRepo> =
            stars.iter().map(|star| (&star.id, star)).collect();

        let create = stars
            .iter()
            .filter(|star| !rows_by_id.contains_key(&star.id))
            .collect();

        let fill_description = rows
            .iter()
            .filter(|row| row.description.is_none())
            .filter_map(|row| {
                let id = row.repo.as_ref()?;
                let star = stars_by_id.get(id)?;
                let description = star.description.as_deref().filter(|x| !x.is_empty())?;
                Some((row, description))
            })
            .collect();

        let prune = rows
            .iter()
            .filter(|row| matches!(&row.repo, Some(id) if !stars_by_id.contains_key(id)))
            .collect();

        Self { create, fill_description, prune }
    }
}

pub struct App<Github, Notion> {
    pub github_username: String,
    pub database_id: String,
    pub github: Github,
    pub notion: Notion,
    pub options: SyncOptions,
}

impl App<GithubClientImpl, NotionClientImpl> {
    pub fn new(config: &Config, options: SyncOptions) -> Result<Self, Error> {
        let github = GithubClientImpl::new(None, &config.github_token)?;
        let notion = NotionClientImpl::new(None, &config.notion_token)?;
        let database_id = notion::parse_database_id(&config.notion_table_url)?;
        let s = Self {
            github_username: config.github_username.clone(),
            database_id,
            github,
            notion,
            options,
        };
        Ok(s)
    }
}

impl<Github, Notion> App<Github, Notion>
where
    Github: GithubClient,
    Notion: NotionClient,
{
    /// One sync pass: fetch both sides, diff, write.
    ///
    /// Idempotent against the table contents. When every star already has a
    /// row and no description is missing, nothing is written.
    pub async fn sync(&self) -> Result<SyncReport, Error> {
        let stars = self.collect_stars().await?;
        info!("retrieved {} starred repositories for {}", stars.len(), self.github_username);
        let rows = self.collect_rows().await?;
        info!("retrieved {} table rows", rows.len());

        let plan = SyncPlan::compute(&stars, &rows);

        if self.options.dry_run {
            for star in &plan.create {
                info!("would add row for {}", star.id);
            }
            for (row, _) in &plan.fill_description {
                if let Some(id) = &row.repo {
                    info!("would fill missing description for {id}");
                }
            }
            if self.options.prune {
                for row in &plan.prune {
                    if let Some(id) = &row.repo {
                        info!("would delete row for {id}");
                    }
                }
            }
            return Ok(SyncReport::default());
        }

        let mut report = SyncReport::default();

        for star in &plan.create {
            self.notion.create_row(&self.database_id, star).await?;
            info!("added row for {}", star.id);
            report.created += 1;
        }

        for (row, description) in &plan.fill_description {
            self.notion.set_description(&row.page_id, description).await?;
            if let Some(id) = &row.repo {
                info!("filled missing description for {id}");
            }
            report.updated += 1;
        }

        if self.options.prune {
            for row in &plan.prune {
                self.notion.archive_row(&row.page_id).await?;
                if let Some(id) = &row.repo {
                    info!("deleted row for {id}");
                }
                report.deleted += 1;
            }
        }

        Ok(report)
    }

    async fn collect_stars(&self) -> Result<Vec<StarredRepo>, Error> {
        let mut seen = HashSet::new();
        let mut stars = Vec::new();
        let mut items = self.github.list_starred(&self.github_username);
        while let Some(star) = items.try_next().await? {
            if !seen.insert(star.id.clone()) {
                warn!("duplicate starred repository {}", star.id);
                continue;
            }
            stars.push(star);
        }
        Ok(stars)
    }

    async fn collect_rows(&self) -> Result<Vec<TableRow>, Error> {
        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        let mut items = self.notion.list_rows(&self.database_id);
        while let Some(row) = items.try_next().await? {
            match &row.repo {
                None => {
                    warn!(page_id = %row.page_id, "skipping row without a repository name");
                    continue;
                }
                Some(id) => {
                    if !seen.insert(id.clone()) {
                        warn!("found duplicate row for {id}");
                        continue;
                    }
                }
            }
            rows.push(row);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use futures::{stream, StreamExt};
    use quickcheck_macros::quickcheck;
    use std::sync::Mutex;

    fn star(full_name: &str) -> StarredRepo {
        let id: RepoId = full_name.parse().unwrap();
        StarredRepo {
            url: format!("https://github.com/{id}"),
            description: Some(format!("description of {id}")),
            language: Some("Rust".to_owned()),
            starred_at: Utc.with_ymd_and_hms(2022, 7, 1, 10, 0, 0).unwrap(),
            id,
        }
    }

    fn row(full_name: &str) -> TableRow {
        let id: RepoId = full_name.parse().unwrap();
        TableRow {
            page_id: format!("page-{id}"),
            url: Some(format!("https://github.com/{id}")),
            description: Some(format!("description of {id}")),
            repo: Some(id),
        }
    }

    struct FakeGithub {
        stars: Vec<StarredRepo>,
    }

    impl GithubClient for FakeGithub {
        fn list_starred<'a>(
            &'a self,
            _username: &'a str,
        ) -> LocalBoxStream<'a, Result<StarredRepo, Error>> {
            stream::iter(self.stars.clone().into_iter().map(Ok)).boxed_local()
        }
    }

    #[derive(Default)]
    struct FakeNotion {
        rows: Vec<TableRow>,
        created: Mutex<Vec<RepoId>>,
        filled: Mutex<Vec<(String, String)>>,
        archived: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotionClient for FakeNotion {
        fn list_rows<'a>(
            &'a self,
            _database_id: &'a str,
        ) -> LocalBoxStream<'a, Result<TableRow, Error>> {
            stream::iter(self.rows.clone().into_iter().map(Ok)).boxed_local()
        }

        async fn create_row(
            &self,
            _database_id: &str,
            star: &StarredRepo,
        ) -> Result<(), Error> {
            self.created.lock().unwrap().push(star.id.clone());
            Ok(())
        }

        async fn set_description(
            &self,
            page_id: &str,
            description: &str,
        ) -> Result<(), Error> {
            self.filled
                .lock()
                .unwrap()
                .push((page_id.to_owned(), description.to_owned()));
            Ok(())
        }

        async fn archive_row(&self, page_id: &str) -> Result<(), Error> {
            self.archived.lock().unwrap().push(page_id.to_owned());
            Ok(())
        }
    }

    fn app(
        stars: Vec<StarredRepo>,
        rows: Vec<TableRow>,
        options: SyncOptions,
    ) -> App<FakeGithub, FakeNotion> {
        App {
            github_username: "kafji".to_owned(),
            database_id: "8a33dfac-6429-4764-9118-ad09bc12c8ce".to_owned(),
            github: FakeGithub { stars },
            notion: FakeNotion { rows, ..Default::default() },
            options,
        }
    }

    #[tokio::test]
    async fn test_creates_exactly_the_missing_rows() {
        let app = app(
            vec![star("a/x"), star("a/y")],
            vec![row("a/x")],
            SyncOptions::default(),
        );
        let report = app.sync().await.unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(*app.notion.created.lock().unwrap(), [RepoId::new("a", "y")]);
        assert!(app.notion.archived.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rerun_with_no_new_stars_writes_nothing() {
        let app = app(
            vec![star("a/x"), star("a/y")],
            vec![row("a/x"), row("a/y")],
            SyncOptions::default(),
        );
        let report = app.sync().await.unwrap();
        assert_eq!(report, SyncReport::default());
        assert!(app.notion.created.lock().unwrap().is_empty());
        assert!(app.notion.filled.lock().unwrap().is_empty());
        assert!(app.notion.archived.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_stars_creates_nothing() {
        let app = app(
            vec![],
            vec![row("a/x"), row("a/y")],
            SyncOptions::default(),
        );
        let report = app.sync().await.unwrap();
        assert_eq!(report.created, 0);
        assert!(app.notion.created.lock().unwrap().is_empty());
        // unstarred rows stay untouched without the prune option
        assert!(app.notion.archived.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fills_missing_description() {
        let mut bare = row("a/x");
        bare.description = None;
        let app = app(vec![star("a/x")], vec![bare], SyncOptions::default());
        let report = app.sync().await.unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(
            *app.notion.filled.lock().unwrap(),
            [("page-a/x".to_owned(), "description of a/x".to_owned())]
        );
    }

    #[tokio::test]
    async fn test_prune_archives_unstarred_rows() {
        let app = app(
            vec![star("a/x")],
            vec![row("a/x"), row("a/y")],
            SyncOptions { prune: true, dry_run: false },
        );
        let report = app.sync().await.unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(*app.notion.archived.lock().unwrap(), ["page-a/y".to_owned()]);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let app = app(
            vec![star("a/x"), star("a/y")],
            vec![row("a/x")],
            SyncOptions { prune: true, dry_run: true },
        );
        let report = app.sync().await.unwrap();
        assert_eq!(report, SyncReport::default());
        assert!(app.notion.created.lock().unwrap().is_empty());
        assert!(app.notion.filled.lock().unwrap().is_empty());
        assert!(app.notion.archived.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_rows_are_counted_once() {
        // a duplicate row must not hide a missing one, nor get pruned twice
        let app = app(
            vec![star("a/x")],
            vec![row("a/x"), row("a/x")],
            SyncOptions::default(),
        );
        let report = app.sync().await.unwrap();
        assert_eq!(report, SyncReport::default());
    }

    #[tokio::test]
    async fn test_rows_without_a_name_are_ignored() {
        let nameless = TableRow {
            page_id: "page-nameless".to_owned(),
            repo: None,
            url: None,
            description: None,
        };
        let app = app(
            vec![star("a/x")],
            vec![nameless, row("a/x")],
            SyncOptions { prune: true, dry_run: false },
        );
        let report = app.sync().await.unwrap();
        assert_eq!(report, SyncReport::default());
        assert!(app.notion.archived.lock().unwrap().is_empty());
    }

    #[quickcheck]
    fn prop_create_is_exact_set_difference(
        starred: Vec<String>,
        existing: Vec<String>,
    ) -> bool {
        let starred: HashSet<String> =
            starred.into_iter().filter(|x| !x.is_empty()).collect();
        let existing: HashSet<String> =
            existing.into_iter().filter(|x| !x.is_empty()).collect();
        let stars: Vec<_> = starred.iter().map(|n| star_named(n)).collect();
        let rows: Vec<_> = existing.iter().map(|n| row_named(n)).collect();
        let plan = SyncPlan::compute(&stars, &rows);
        let created: HashSet<String> =
            plan.create.iter().map(|x| x.id.name.clone()).collect();
        let expected: HashSet<String> =
            starred.difference(&existing).cloned().collect();
        created == expected
    }

    #[quickcheck]
    fn prop_no_writes_when_every_star_has_a_row(names: Vec<String>) -> bool {
        let names: HashSet<String> =
            names.into_iter().filter(|x| !x.is_empty()).collect();
        let stars: Vec<_> = names.iter().map(|n| star_named(n)).collect();
        let rows: Vec<_> = names.iter().map(|n| row_named(n)).collect();
        let plan = SyncPlan::compute(&stars, &rows);
        plan.create.is_empty() && plan.fill_description.is_empty() && plan.prune.is_empty()
    }

    fn star_named(name: &str) -> StarredRepo {
        StarredRepo {
            id: RepoId::new("o", name),
            url: format!("https://github.com/o/{name}"),
            description: Some("d".to_owned()),
            language: None,
            starred_at: Utc.with_ymd_and_hms(2022, 7, 1, 10, 0, 0).unwrap(),
        }
    }

    fn row_named(name: &str) -> TableRow {
        TableRow {
            page_id: format!("page-{name}"),
            repo: Some(RepoId::new("o", name)),
            url: None,
            description: Some("d".to_owned()),
        }
    }
}

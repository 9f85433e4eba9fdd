use super::{
    error::Error,
    requests::{self, CreatePage, Parent, QueryDatabase, UpdatePage},
    responses::{Page, QueryDatabaseResponse},
    COL_DESCRIPTION,
};
use crate::{app::NotionClient, StarredRepo, TableRow};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::{
    stream::{LocalBoxStream, StreamExt, TryStreamExt},
    Stream,
};
use http::{
    header::{AUTHORIZATION, USER_AGENT},
    HeaderMap, HeaderName, HeaderValue,
};
use reqwest::{Client, ClientBuilder};
use sekret::Secret;
use serde_json::Map;
use tracing::debug;
use url::Url;

type ClientResult<T> = Result<T, Error>;

/// [Notion API versioning](https://developers.notion.com/reference/versioning).
pub const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug)]
pub struct NotionClientImpl {
    base_url: Url,
    http: Client,
}

impl NotionClientImpl {
    pub fn new(
        base_url: impl Into<Option<Url>>,
        token: &Secret<String>,
    ) -> ClientResult<Self> {
        let base_url: Url = base_url
            .into()
            .map(Result::Ok)
            .unwrap_or_else(|| "https://api.notion.com/".parse())?;

        let headers = {
            let mut headers = HeaderMap::new();

            let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            headers.insert(USER_AGENT, HeaderValue::from_str(&user_agent)?);

            let mut authorization: HeaderValue =
                format!("Bearer {}", token.0).try_into()?;
            authorization.set_sensitive(true);
            headers.insert(AUTHORIZATION, authorization);

            headers.insert(
                HeaderName::from_static("notion-version"),
                HeaderValue::from_static(NOTION_VERSION),
            );

            headers
        };

        let http = ClientBuilder::new().default_headers(headers).build()?;

        let client = NotionClientImpl { base_url, http };
        debug!(?client);

        Ok(client)
    }

    fn build_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }

    /// Query a database, following the response cursor until exhausted.
    ///
    /// [Notion Docs].
    ///
    /// [Notion Docs]: https://developers.notion.com/reference/post-database-query
    pub fn query_database<'a>(
        &'a self,
        database_id: &'a str,
    ) -> impl Stream<Item = ClientResult<Page>> + 'a {
        try_stream! {
            let url = self.build_url(&format!("/v1/databases/{database_id}/query"));
            let mut cursor: Option<String> = None;
            loop {
                let body = QueryDatabase { start_cursor: cursor.clone(), page_size: 100 };
                let request = self.http.post(url.clone()).json(&body);
                debug!(?request, "sending request");
                let response = request.send().await?;
                debug!(?response, "received response");
                let response = check_status(response).await?;
                let body: QueryDatabaseResponse = response.json().await?;
                for page in body.results {
                    yield page;
                }
                if !body.has_more {
                    break;
                }
                cursor = body.next_cursor;
            }
        }
    }

    /// Create a page in a database.
    ///
    /// [Notion Docs].
    ///
    /// [Notion Docs]: https://developers.notion.com/reference/post-page
    pub async fn create_page(&self, page: &CreatePage) -> ClientResult<()> {
        let url = self.build_url("/v1/pages");
        let request = self.http.post(url).json(page);
        debug!(?request, "sending request");
        let response = request.send().await?;
        debug!(?response, "received response");
        check_status(response).await?;
        Ok(())
    }

    /// Update page properties, or archive the page.
    ///
    /// [Notion Docs].
    ///
    /// [Notion Docs]: https://developers.notion.com/reference/patch-page
    pub async fn update_page(&self, page_id: &str, fields: &UpdatePage) -> ClientResult<()> {
        let url = self.build_url(&format!("/v1/pages/{page_id}"));
        let request = self.http.patch(url).json(fields);
        debug!(?request, "sending request");
        let response = request.send().await?;
        debug!(?response, "received response");
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(Error::Api { status: status.as_u16(), message })
}

#[async_trait]
impl NotionClient for NotionClientImpl {
    fn list_rows<'a>(
        &'a self,
        database_id: &'a str,
    ) -> LocalBoxStream<'a, Result<TableRow, anyhow::Error>> {
        self.query_database(database_id)
            .map_ok(TableRow::from)
            .map_err(anyhow::Error::from)
            .boxed_local()
    }

    async fn create_row(
        &self,
        database_id: &str,
        star: &StarredRepo,
    ) -> Result<(), anyhow::Error> {
        let page = CreatePage {
            parent: Parent { database_id: database_id.to_owned() },
            properties: requests::star_properties(star),
        };
        self.create_page(&page).await?;
        Ok(())
    }

    async fn set_description(
        &self,
        page_id: &str,
        description: &str,
    ) -> Result<(), anyhow::Error> {
        let mut properties = Map::new();
        properties.insert(
            COL_DESCRIPTION.to_owned(),
            requests::rich_text_prop(description),
        );
        let fields = UpdatePage { properties: Some(properties), archived: None };
        self.update_page(page_id, &fields).await?;
        Ok(())
    }

    async fn archive_row(&self, page_id: &str) -> Result<(), anyhow::Error> {
        let fields = UpdatePage { properties: None, archived: Some(true) };
        self.update_page(page_id, &fields).await?;
        Ok(())
    }
}

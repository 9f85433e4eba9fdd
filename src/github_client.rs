use crate::{app::GithubClient, github_models::GhStar, StarredRepo};
use anyhow::Error;
use async_stream::try_stream;
use futures::{
    future,
    stream::{LocalBoxStream, StreamExt, TryStreamExt},
    Future, Stream,
};
use http::header::HeaderName;
use octocrab::{Octocrab, Page};
use sekret::Secret;
use std::borrow::Cow;
use url::Url;

#[derive(Clone, Debug)]
pub struct GithubClientImpl {
    client: Octocrab,
}

impl GithubClientImpl {
    /// `base_url` defaults to the public GitHub API when `None`.
    pub fn new(
        base_url: impl Into<Option<Url>>,
        token: &Secret<String>,
    ) -> Result<Self, Error> {
        let user_agent = concat!(
            env!("CARGO_PKG_NAME"),
            concat!("/", env!("CARGO_PKG_VERSION"))
        )
        .to_owned();
        let mut builder = Octocrab::builder()
            .add_header(HeaderName::from_static("user-agent"), user_agent)
            // `star+json` exposes `starred_at` on the starred listing.
            .add_header(
                HeaderName::from_static("accept"),
                "application/vnd.github.star+json".to_owned(),
            )
            .personal_token(token.0.clone());
        if let Some(base_url) = base_url.into() {
            builder = builder.base_url(base_url)?;
        }
        let client = builder.build()?;
        let s = Self { client };
        Ok(s)
    }
}

impl GithubClient for GithubClientImpl {
    /// https://docs.github.com/en/rest/activity/starring#list-repositories-starred-by-a-user
    fn list_starred<'a>(
        &'a self,
        username: &'a str,
    ) -> LocalBoxStream<'a, Result<StarredRepo, Error>> {
        let this = self.clone();
        let username = username.to_owned();
        let items = unpage(move |page_num| {
            let client = this.client.clone();
            let username = username.clone();
            async move {
                let path: Cow<_> = if let Some(page_num) = page_num {
                    format!("users/{username}/starred?per_page=100&page={page_num}").into()
                } else {
                    format!("users/{username}/starred?per_page=100").into()
                };
                let items: Page<GhStar> = client.get::<_, _, ()>(path, None).await?;
                Ok(items)
            }
        });
        items
            .and_then(|star| future::ready(StarredRepo::try_from(star)))
            .boxed_local()
    }
}

fn unpage<'a, T, F, Fut>(fetch: F) -> impl Stream<Item = Result<T, Error>> + 'a
where
    T: Send + 'static,
    F: Fn(Option<u8>) -> Fut + 'a,
    Fut: Future<Output = Result<Page<T>, Error>> + 'a,
{
    try_stream! {
        let mut page_num = None;
        loop {
            let page = fetch(page_num).await?;
            let has_next = page.next.is_some();
            for item in page {
                yield item;
            }
            if !has_next {
                break;
            }
            page_num = (page_num.unwrap_or(1) + 1).into();
        }
    }
}

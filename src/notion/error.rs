use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Header(#[from] http::header::InvalidHeaderValue),

    #[error("Notion API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Cannot find a database id in `{0}`.")]
    BadTableUrl(String),
}

pub mod client;
pub mod error;
pub mod requests;
pub mod responses;
pub mod table_url;

pub use client::NotionClientImpl;
pub use error::Error;
pub use table_url::parse_database_id;

/// Column names the target table is expected to have.
pub const COL_NAME: &str = "Name";
pub const COL_URL: &str = "URL";
pub const COL_DESCRIPTION: &str = "Description";
pub const COL_LANGUAGE: &str = "Language";
pub const COL_STARRED: &str = "Starred";

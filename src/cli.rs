use clap::Parser;

/// Copy the configured user's GitHub stars into a Notion table.
///
/// Credentials come from the environment: GH_USERNAME, GH_TOKEN,
/// NOTION_TABLE_URL, and NOTION_TOKEN.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// Archive table rows whose repository is no longer starred.
    #[clap(long)]
    pub prune: bool,

    /// Compute and log the plan without writing to the table.
    #[clap(long)]
    pub dry_run: bool,
}

pub fn cmd() -> Cli {
    Cli::parse()
}

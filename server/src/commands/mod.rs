use clap::Subcommand;

use crate::Result;

pub(crate) mod validate;

#[derive(Subcommand, Debug, Default)]
pub(crate) enum Command {
    /// Run the web app
    #[default]
    Serve,
    /// Check the embedded recipe, cuisine and vocabulary tables
    Validate,
}

impl Command {
    pub(crate) async fn run(&self) -> Result<()> {
        match &self {
            Command::Serve => crate::http_server::cmd::serve().await,
            Command::Validate => validate::validate(),
        }
    }
}

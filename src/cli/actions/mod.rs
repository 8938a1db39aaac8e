pub mod hash_password;
pub mod server;

use anyhow::Result;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    HashPassword(hash_password::Args),
}

impl Action {
    /// Run the selected action.
    ///
    /// # Errors
    /// Returns whatever error the action itself fails with.
    pub async fn execute(self) -> Result<()> {
        match self {
            Self::Server(args) => server::execute(args).await,
            Self::HashPassword(args) => hash_password::execute(args).await,
        }
    }
}

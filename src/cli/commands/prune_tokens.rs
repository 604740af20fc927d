use crate::config::Config;
use crate::db::Store;
use crate::services::{SeaOrmTokenService, TokenService};

pub async fn cmd_prune_tokens(config: &Config) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let tokens = SeaOrmTokenService::new(store, config.security.token_length);
    let removed = tokens.prune_expired().await?;

    if removed == 0 {
        println!("No expired tokens found.");
    } else {
        println!("✓ Removed {removed} expired token(s).");
    }

    Ok(())
}

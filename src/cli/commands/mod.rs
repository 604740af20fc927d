mod init;
mod prune_tokens;

pub use init::cmd_init;
pub use prune_tokens::cmd_prune_tokens;

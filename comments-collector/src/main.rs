mod collection;
mod utils;

use {
    tracing::info,
    comments_core::config::Config,
    crate::{
        collection::run_collection_step,
        utils::init_logging,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("comment collector");

    let config = Config::load();
    run_collection_step(&config.collector()).await
}

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::sync::Arc;

use gb28181_server::config::Config;
use registrar::UserAgentPolicy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(Config::load()?);
    simple_logger::init_with_level(config.log.level.as_level())?;

    if let Some(path) = &config.registrar.user_agent_config {
        let policy = UserAgentPolicy::from_xml(&std::fs::read_to_string(path)?)?;
        log::info!("user agent policy: path={:?}, entries={}", path, policy.len());
    }

    // The SIP wire transport (parsing, transactions, sockets) is a
    // deployment collaborator. Without one linked in there is nothing to
    // serve; embedders call gb28181_server::startup with theirs.
    log::warn!(
        "No SIP transport is wired in, no features are enabled, it's just a program without any functionality :-)"
    );

    Ok(())
}

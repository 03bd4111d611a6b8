pub mod paper;
pub mod telegram;
pub mod traits;

use tracing::info;

use crate::config::Config;
use paper::LogPublisher;
use telegram::TelegramPublisher;
use traits::Publisher;

/// Picks the live Telegram publisher, or the log publisher in dry-run mode.
pub fn from_config(config: &Config) -> anyhow::Result<Box<dyn Publisher>> {
    let publisher: Box<dyn Publisher> = if config.dry_run {
        Box::new(LogPublisher::new(config.channel_id.as_str()))
    } else {
        Box::new(TelegramPublisher::new(
            &config.endpoints.telegram_api_url,
            &config.telegram_bot_token,
            config.channel_id.as_str(),
            config.http_timeout,
        )?)
    };

    info!(publisher = publisher.name(), channel_id = %config.channel_id, "publisher ready");
    Ok(publisher)
}

use tarifa_core::config::{AppConfig, LoadOptions};

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.push(format!("  database.url = {}", config.database.url));
    lines.push(format!("  database.max_connections = {}", config.database.max_connections));
    lines.push(format!("  database.timeout_secs = {}", config.database.timeout_secs));
    lines.push(format!("  server.bind_address = {}", config.server.bind_address));
    lines.push(format!("  server.port = {}", config.server.port));
    lines.push(format!(
        "  leads.notification_email = {}",
        config.leads.notification_email.as_deref().unwrap_or("(unset)")
    ));
    lines.push(format!("  logging.level = {}", config.logging.level));
    lines.push(format!("  logging.format = {:?}", config.logging.format));
    lines.join("\n")
}

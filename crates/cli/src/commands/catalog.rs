use tarifa_core::config::{AppConfig, LoadOptions};
use tarifa_core::Language;
use tarifa_db::{connect, SqlCatalogRepository};

pub fn run(lang: &str) -> String {
    let language: Language = match lang.parse() {
        Ok(language) => language,
        Err(error) => return format!("invalid --lang value: {error}"),
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => return format!("failed to initialize async runtime: {error}"),
    };

    let snapshot = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| format!("database connection failed: {error}"))?;
        let snapshot = SqlCatalogRepository::new(pool.clone())
            .load_snapshot()
            .await
            .map_err(|error| format!("catalog load failed: {error}"));
        pool.close().await;
        snapshot
    });

    let snapshot = match snapshot {
        Ok(snapshot) => snapshot,
        Err(message) => return message,
    };

    let mut lines = vec!["fiber tiers:".to_owned()];
    for tier in snapshot.fiber_tiers() {
        let description = tier
            .description
            .as_ref()
            .map(|text| format!(" ({})", text.get(language)))
            .unwrap_or_default();
        lines.push(format!(
            "  {:<4} {:>6}Mb {:>8}€  {}{}",
            tier.id.0, tier.speed_mb, tier.price, tier.name, description
        ));
    }

    lines.push("mobile tiers:".to_owned());
    for tier in snapshot.mobile_tiers() {
        lines.push(format!("  {:<4} {:>6} {:>8}€  {}", tier.id.0, tier.gb, tier.price, tier.name));
    }

    lines.push("bundles:".to_owned());
    for bundle in snapshot.bundles() {
        lines.push(format!(
            "  {:<4} {:>6}Mb {:>8}€  {} - {}",
            bundle.id.0,
            bundle.speed_mb,
            bundle.price,
            bundle.name.get(language),
            bundle.description.get(language)
        ));
    }

    lines.join("\n")
}

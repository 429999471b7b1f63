use crate::commands::{blocking_runtime, load_config, CommandError, CommandResult};
use tarifa_core::{recommend, FiberTierId, GbAllowance, Language, Recommendation, TariffSelection};
use tarifa_db::{connect, SqlCatalogRepository};

pub fn run(fiber: &str, line_gbs: &[i64], lang: &str, json: bool) -> CommandResult {
    match execute(fiber, line_gbs, lang, json) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("recommend", error),
    }
}

fn execute(fiber: &str, line_gbs: &[i64], lang: &str, json: bool) -> Result<String, CommandError> {
    let language: Language = lang
        .parse()
        .map_err(|error: tarifa_core::DomainError| CommandError::InvalidArgument(error.to_string()))?;

    let mut selection = TariffSelection::new(FiberTierId(fiber.to_owned()));
    for gb in line_gbs {
        let gb = GbAllowance::new(*gb)
            .map_err(|error| CommandError::InvalidArgument(error.to_string()))?;
        selection.add_line(gb);
    }

    let config = load_config()?;
    let runtime = blocking_runtime()?;

    let snapshot = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| CommandError::DbConnectivity(error.to_string()))?;
        let snapshot = SqlCatalogRepository::new(pool.clone())
            .load_snapshot()
            .await
            .map_err(|error| CommandError::CatalogLoad(error.to_string()));
        pool.close().await;
        snapshot
    })?;

    let recommendation = recommend(&snapshot, &selection, language)
        .map_err(|error| CommandError::Recommendation(error.to_string()))?;

    if json {
        serde_json::to_string_pretty(&recommendation)
            .map_err(|error| CommandError::Serialization(error.to_string()))
    } else {
        Ok(render(&recommendation))
    }
}

fn render(recommendation: &Recommendation) -> String {
    let mut lines = vec![format!(
        "{}: {}€",
        recommendation.custom_name, recommendation.custom_price
    )];
    if recommendation.is_savings {
        lines.push(format!(
            "{}: {}€ (saves {}€)",
            recommendation.recommended_name,
            recommendation.recommended_price,
            recommendation.savings_amount
        ));
        if recommendation.speed_diff_mb > 0 {
            lines.push(format!("  +{}Mb extra speed", recommendation.speed_diff_mb));
        }
        if recommendation.gb_diff > 0 {
            lines.push(format!("  +{}GB extra data", recommendation.gb_diff));
        }
    } else {
        lines.push("no bundle beats this selection".to_owned());
    }
    for detail in &recommendation.recommended_details {
        lines.push(format!("  - {detail}"));
    }
    lines.join("\n")
}

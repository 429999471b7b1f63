use crate::commands::{blocking_runtime, load_config, CommandError, CommandResult};
use tarifa_db::{connect, migrations, RateCardSeed};

pub fn run() -> CommandResult {
    match execute() {
        Ok(message) => CommandResult::success("seed", message),
        Err(error) => CommandResult::failure("seed", error),
    }
}

fn execute() -> Result<String, CommandError> {
    let config = load_config()?;
    let runtime = blocking_runtime()?;

    runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| CommandError::DbConnectivity(error.to_string()))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| CommandError::Migration(error.to_string()))?;

        let seed_result = RateCardSeed::load(&pool)
            .await
            .map_err(|error| CommandError::SeedExecution(error.to_string()))?;

        let verification = RateCardSeed::verify(&pool)
            .await
            .map_err(|error| CommandError::SeedVerification(error.to_string()))?;
        pool.close().await;

        if !verification.all_present {
            let failed: Vec<&str> = verification
                .checks
                .iter()
                .filter_map(|(check, passed)| (!passed).then_some(*check))
                .collect();
            return Err(CommandError::SeedVerification(format!(
                "failed checks: {}",
                failed.join(", ")
            )));
        }

        Ok(format!(
            "loaded production rate card: {} fiber tiers, {} mobile tiers, {} bundles",
            seed_result.fiber_tiers, seed_result.mobile_tiers, seed_result.bundles
        ))
    })
}

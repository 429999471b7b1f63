use crate::commands::{blocking_runtime, load_config, CommandError, CommandResult};
use tarifa_db::{connect, migrations};

pub fn run() -> CommandResult {
    match execute() {
        Ok(message) => CommandResult::success("migrate", message),
        Err(error) => CommandResult::failure("migrate", error),
    }
}

fn execute() -> Result<String, CommandError> {
    let config = load_config()?;
    let runtime = blocking_runtime()?;

    runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| CommandError::DbConnectivity(error.to_string()))?;
        let outcome = migrations::run_pending(&pool)
            .await
            .map_err(|error| CommandError::Migration(error.to_string()))?;
        pool.close().await;

        Ok(format!(
            "applied {} pending migration(s), {} embedded in total",
            outcome.newly_applied, outcome.total
        ))
    })
}

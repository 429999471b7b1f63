pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "tarifa",
    about = "Tarifa operator CLI",
    long_about = "Operate the tarifa rate catalog: migrations, seeding, catalog inspection, and ad-hoc tariff recommendations.",
    after_help = "Examples:\n  tarifa migrate\n  tarifa seed\n  tarifa recommend --fiber f2 --line 3 --line 50\n  tarifa doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the production rate card into the database and verify it")]
    Seed,
    #[command(about = "Print the persisted rate card")]
    Catalog {
        #[arg(long, default_value = "ca", help = "Language for localized fields (ca or es)")]
        lang: String,
    },
    #[command(about = "Compute a tariff recommendation for a fiber selection and mobile lines")]
    Recommend {
        #[arg(long, help = "Fiber tier id, e.g. f2")]
        fiber: String,
        #[arg(long = "line", help = "Desired GB for one mobile line; -1 means unlimited. Repeatable.")]
        lines: Vec<i64>,
        #[arg(long, default_value = "ca", help = "Language for labels (ca or es)")]
        lang: String,
        #[arg(long, help = "Emit the raw recommendation as JSON")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values")]
    Config,
    #[command(about = "Validate config, database connectivity, and catalog readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Catalog { lang } => {
            commands::CommandResult { exit_code: 0, output: commands::catalog::run(&lang) }
        }
        Command::Recommend { fiber, lines, lang, json } => commands::recommend::run(&fiber, &lines, &lang, json),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

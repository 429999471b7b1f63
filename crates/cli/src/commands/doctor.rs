use serde::Serialize;
use tarifa_core::config::{AppConfig, LoadOptions};
use tarifa_db::{connect, SqlCatalogRepository};

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    ok: bool,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    status: &'static str,
    checks: Vec<DoctorCheck>,
}

pub fn run(json: bool) -> String {
    let mut checks = Vec::new();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config",
                ok: true,
                detail: "configuration loaded and validated".to_owned(),
            });
            Some(config)
        }
        Err(error) => {
            checks.push(DoctorCheck { name: "config", ok: false, detail: error.to_string() });
            None
        }
    };

    if let Some(config) = config {
        match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime.block_on(async {
                match connect(&config.database).await {
                    Ok(pool) => {
                        checks.push(DoctorCheck {
                            name: "database",
                            ok: true,
                            detail: "database connection established".to_owned(),
                        });
                        match SqlCatalogRepository::new(pool.clone()).load_snapshot().await {
                            Ok(snapshot) => checks.push(DoctorCheck {
                                name: "catalog",
                                ok: true,
                                detail: format!(
                                    "{} fiber tiers, {} mobile tiers, {} bundles",
                                    snapshot.fiber_tiers().len(),
                                    snapshot.mobile_tiers().len(),
                                    snapshot.bundles().len()
                                ),
                            }),
                            Err(error) => checks.push(DoctorCheck {
                                name: "catalog",
                                ok: false,
                                detail: format!("catalog not ready: {error}"),
                            }),
                        }
                        pool.close().await;
                    }
                    Err(error) => checks.push(DoctorCheck {
                        name: "database",
                        ok: false,
                        detail: error.to_string(),
                    }),
                }
            }),
            Err(error) => {
                checks.push(DoctorCheck { name: "runtime", ok: false, detail: error.to_string() })
            }
        }
    }

    let status = if checks.iter().all(|check| check.ok) { "ready" } else { "degraded" };
    let report = DoctorReport { status, checks };

    if json {
        return serde_json::to_string_pretty(&report)
            .unwrap_or_else(|error| format!("doctor report serialization failed: {error}"));
    }

    let mut lines = vec![format!("status: {}", report.status)];
    for check in report.checks {
        lines.push(format!("  [{}] {}: {}", if check.ok { "ok" } else { "!!" }, check.name, check.detail));
    }
    lines.join("\n")
}

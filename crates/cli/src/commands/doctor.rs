use serde::Serialize;
use shopfront_core::config::{AppConfig, LoadOptions};
use shopfront_db::{connect_with_config, schema::CATALOG_TABLES};

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run() -> CommandResult {
    let report = build_report();
    let failed = report.overall_status == CheckStatus::Fail;
    let data = serde_json::to_value(&report).ok();

    if failed {
        let failing = report
            .checks
            .iter()
            .filter(|check| check.status == CheckStatus::Fail)
            .map(|check| check.name)
            .collect::<Vec<_>>();
        return CommandResult::failure(
            "doctor",
            "readiness",
            format!("{} (failing: {})", report.summary, failing.join(", ")),
            1,
        );
    }

    CommandResult::success_with_data("doctor", report.summary.clone(), data)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_admin_token(&config));
            checks.push(check_database(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["admin_token", "database_connectivity"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let any_fail = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let (overall_status, summary) = if any_fail {
        (CheckStatus::Fail, "doctor: one or more readiness checks failed")
    } else if all_pass {
        (CheckStatus::Pass, "doctor: all readiness checks passed")
    } else {
        (CheckStatus::Warn, "doctor: ready with warnings")
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

fn check_admin_token(config: &AppConfig) -> DoctorCheck {
    if config.admin_enabled() {
        DoctorCheck {
            name: "admin_token",
            status: CheckStatus::Pass,
            details: "admin token configured; catalog writes enabled".to_string(),
        }
    } else {
        DoctorCheck {
            name: "admin_token",
            status: CheckStatus::Warn,
            details: "no admin token configured; catalog writes will return 403".to_string(),
        }
    }
}

fn check_database(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "database_connectivity",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;

        let mut present = 0usize;
        for table in CATALOG_TABLES {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
            )
            .bind(*table)
            .fetch_one(&pool)
            .await
            .map_err(|error| format!("failed to inspect schema: {error}"))?;
            present += usize::from(exists == 1);
        }

        pool.close().await;
        Ok::<usize, String>(present)
    });

    match result {
        Ok(present) if present == CATALOG_TABLES.len() => DoctorCheck {
            name: "database_connectivity",
            status: CheckStatus::Pass,
            details: format!("connected using `{}`; catalog tables present", config.database.url),
        },
        Ok(_) => DoctorCheck {
            name: "database_connectivity",
            status: CheckStatus::Warn,
            details: format!(
                "connected using `{}`; catalog tables missing (run `shopfront seed`)",
                config.database.url
            ),
        },
        Err(error) => {
            DoctorCheck { name: "database_connectivity", status: CheckStatus::Fail, details: error }
        }
    }
}

use std::fmt;

use serde::Serialize;
use vouchers_core::config::{AppConfig, LoadOptions, StorageBackend};
use vouchers_db::Storage;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

impl CheckStatus {
    fn marker(self) -> &'static str {
        match self {
            Self::Pass => "ok",
            Self::Fail => "fail",
            Self::Skipped => "skip",
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into() }
    }

    fn fail(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into() }
    }

    fn skipped(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Skipped, details: details.into() }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    /// Any check that did not pass, skipped ones included, fails the report.
    fn from_checks(checks: Vec<DoctorCheck>) -> Self {
        let healthy = checks.iter().all(|check| check.status == CheckStatus::Pass);
        Self {
            overall_status: if healthy { CheckStatus::Pass } else { CheckStatus::Fail },
            summary: if healthy {
                "doctor: all readiness checks passed".to_string()
            } else {
                "doctor: one or more readiness checks failed".to_string()
            },
            checks,
        }
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)?;
        for check in &self.checks {
            write!(f, "\n- [{}] {}: {}", check.status.marker(), check.name, check.details)?;
        }
        Ok(())
    }
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if !json_output {
        return report.to_string();
    }

    serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
        format!(
            "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

fn build_report() -> DoctorReport {
    let checks = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => vec![
            DoctorCheck::pass(
                "config_validation",
                format!(
                    "configuration loaded and validated ({} backend)",
                    config.storage.backend.as_str()
                ),
            ),
            check_storage_readiness(&config),
        ],
        Err(error) => vec![
            DoctorCheck::fail("config_validation", error.to_string()),
            DoctorCheck::skipped("storage_readiness", "skipped because configuration did not load"),
        ],
    };

    DoctorReport::from_checks(checks)
}

/// Opens the configured backend (connecting and migrating for SQL) and pings it once.
fn check_storage_readiness(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck::fail(
                "storage_readiness",
                format!("failed to initialize async runtime: {error}"),
            );
        }
    };

    let readiness = runtime.block_on(async {
        let storage = Storage::open(config)
            .await
            .map_err(|error| format!("failed to open storage: {error}"))?;
        let pinged = storage.ping().await.map_err(|error| format!("storage ping failed: {error}"));
        if let Some(pool) = &storage.pool {
            pool.close().await;
        }
        pinged
    });

    match readiness {
        Ok(()) => DoctorCheck::pass(
            "storage_readiness",
            match config.storage.backend {
                StorageBackend::Memory => "in-memory storage ready".to_string(),
                StorageBackend::File => {
                    format!("file storage ready in `{}`", config.storage.data_dir.display())
                }
                StorageBackend::Sql => format!("connected using `{}`", config.database.url),
            },
        ),
        Err(error) => DoctorCheck::fail("storage_readiness", error),
    }
}

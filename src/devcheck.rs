// Development-only self-check. Compares what the host mounted against the config
// and logs the outcome. Release builds return an empty, disabled report.

use serde::{Deserialize, Serialize};

use crate::config::LandingConfig;

/// What the host observed after mounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfCheckProbe {
    /// Number of `<section>` elements in the document.
    pub section_count: u32,
    /// Whether the HUD container was found.
    pub hud_present: bool,
    /// Status of a HEAD request for the vector asset; `None` if it failed outright.
    #[serde(default)]
    pub asset_status: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SelfCheckReport {
    pub enabled: bool,
    pub checks: Vec<CheckResult>,
}

impl SelfCheckReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

#[cfg(debug_assertions)]
pub fn run(config: &LandingConfig, probe: &SelfCheckProbe) -> SelfCheckReport {
    let expected = config.page_count();
    let checks = vec![
        CheckResult {
            name: "section_count".into(),
            passed: probe.section_count == expected,
            detail: format!("expected {} sections, found {}", expected, probe.section_count),
        },
        CheckResult {
            name: "hud_present".into(),
            passed: probe.hud_present,
            detail: if probe.hud_present {
                "HUD found".into()
            } else {
                "HUD not found".into()
            },
        },
        CheckResult {
            name: "vector_asset".into(),
            passed: matches!(probe.asset_status, Some(s) if (200..300).contains(&s)),
            detail: match probe.asset_status {
                Some(s) => format!("HEAD status {}", s),
                None => "HEAD request failed".into(),
            },
        },
    ];

    for check in &checks {
        if check.passed {
            tracing::info!(check = %check.name, detail = %check.detail, "dev self-check passed");
        } else {
            tracing::warn!(check = %check.name, detail = %check.detail, "dev self-check failed");
        }
    }

    SelfCheckReport {
        enabled: true,
        checks,
    }
}

#[cfg(not(debug_assertions))]
pub fn run(_config: &LandingConfig, _probe: &SelfCheckProbe) -> SelfCheckReport {
    SelfCheckReport::default()
}

#[cfg(all(test, debug_assertions))]
mod tests {
    use super::*;

    fn init_logs() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn healthy_mount_passes() {
        init_logs();
        let probe = SelfCheckProbe {
            section_count: 12,
            hud_present: true,
            asset_status: Some(200),
        };
        let report = run(&LandingConfig::default(), &probe);
        assert!(report.enabled);
        assert_eq!(report.checks.len(), 3);
        assert!(report.all_passed());
    }

    #[test]
    fn reports_each_failure() {
        init_logs();
        let probe = SelfCheckProbe {
            section_count: 10,
            hud_present: false,
            asset_status: None,
        };
        let report = run(&LandingConfig::default(), &probe);
        assert!(report.checks.iter().all(|c| !c.passed));
        assert!(report.checks[0].detail.contains("expected 12"));
    }
}

//! Health and performance grading.
//!
//! Both verdicts are ordered rule tables evaluated first-match-wins. An
//! unavailable signal never satisfies a guard: it can neither confirm a
//! healthy state nor report an offline one.

use crate::model::{
    DiskMetrics, DiskRecord, HealthClassification, HealthStatus, OperationalStatus,
    PerformanceTier, Reading, VolumeRecord,
};

/// Inputs to the health classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthSignals {
    pub disk_health: Option<HealthStatus>,
    pub volume_health: Option<HealthStatus>,
    pub operational: Option<OperationalStatus>,
    pub error_count: u32,
}

impl HealthSignals {
    pub fn from_row(volume: &VolumeRecord, disk: &Reading<DiskRecord>, error_count: u32) -> Self {
        Self {
            disk_health: disk.as_option().and_then(|disk| disk.health.into_option()),
            volume_health: volume.health.into_option(),
            operational: volume.operational.clone().into_option(),
            error_count,
        }
    }

    fn either_health(&self, status: HealthStatus) -> bool {
        self.disk_health == Some(status) || self.volume_health == Some(status)
    }
}

pub struct HealthRule {
    pub name: &'static str,
    pub verdict: HealthClassification,
    pub applies: fn(&HealthSignals) -> bool,
}

pub const FALLBACK_RULE: &str = "no-signal";

pub static HEALTH_RULES: [HealthRule; 5] = [
    HealthRule {
        name: "healthy-and-error-free",
        verdict: HealthClassification::Healthy,
        applies: healthy_and_error_free,
    },
    HealthRule {
        name: "warning-reported",
        verdict: HealthClassification::Warning,
        applies: warning_reported,
    },
    HealthRule {
        name: "unhealthy-reported",
        verdict: HealthClassification::Failed,
        applies: unhealthy_reported,
    },
    HealthRule {
        name: "not-operational",
        verdict: HealthClassification::Offline,
        applies: not_operational,
    },
    HealthRule {
        name: "errors-logged",
        verdict: HealthClassification::Errors,
        applies: errors_logged,
    },
];

fn healthy_and_error_free(signals: &HealthSignals) -> bool {
    signals.disk_health == Some(HealthStatus::Healthy)
        && signals.volume_health == Some(HealthStatus::Healthy)
        && signals.error_count == 0
}

fn warning_reported(signals: &HealthSignals) -> bool {
    signals.either_health(HealthStatus::Warning)
}

fn unhealthy_reported(signals: &HealthSignals) -> bool {
    signals.either_health(HealthStatus::Unhealthy)
}

fn not_operational(signals: &HealthSignals) -> bool {
    signals
        .operational
        .as_ref()
        .is_some_and(|status| !status.is_ok())
}

fn errors_logged(signals: &HealthSignals) -> bool {
    signals.error_count > 0
}

pub fn matching_health_rule(signals: &HealthSignals) -> Option<&'static HealthRule> {
    HEALTH_RULES.iter().find(|rule| (rule.applies)(signals))
}

/// Returns the verdict and the name of the rule that produced it.
pub fn classify_health(signals: &HealthSignals) -> (HealthClassification, &'static str) {
    match matching_health_rule(signals) {
        Some(rule) => (rule.verdict, rule.name),
        None => (HealthClassification::Unknown, FALLBACK_RULE),
    }
}

pub struct TierBand {
    /// Exclusive upper bound of the mean latency in milliseconds.
    pub below_ms: f64,
    pub tier: PerformanceTier,
}

pub static TIER_BANDS: [TierBand; 3] = [
    TierBand {
        below_ms: 1.0,
        tier: PerformanceTier::Excellent,
    },
    TierBand {
        below_ms: 5.0,
        tier: PerformanceTier::Good,
    },
    TierBand {
        below_ms: 15.0,
        tier: PerformanceTier::Fair,
    },
];

pub fn tier_for_latency(mean_latency_ms: f64) -> PerformanceTier {
    TIER_BANDS
        .iter()
        .find(|band| mean_latency_ms < band.below_ms)
        .map(|band| band.tier)
        .unwrap_or(PerformanceTier::Poor)
}

/// Needs both read and write latency.
pub fn grade_performance(metrics: &DiskMetrics) -> PerformanceTier {
    match (metrics.read_latency_ms, metrics.write_latency_ms) {
        (Reading::Available(read), Reading::Available(write)) => {
            tier_for_latency((read + write) / 2.0)
        }
        _ => PerformanceTier::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(
        disk: Option<HealthStatus>,
        volume: Option<HealthStatus>,
        operational: Option<&str>,
        error_count: u32,
    ) -> HealthSignals {
        HealthSignals {
            disk_health: disk,
            volume_health: volume,
            operational: operational.and_then(OperationalStatus::parse),
            error_count,
        }
    }

    fn latencies(read: Option<f64>, write: Option<f64>) -> DiskMetrics {
        DiskMetrics {
            read_latency_ms: read.into(),
            write_latency_ms: write.into(),
            ..DiskMetrics::default()
        }
    }

    use HealthStatus::{Healthy, Unhealthy, Warning};

    #[test]
    fn healthy_when_both_healthy_and_no_errors() {
        let verdict = classify_health(&signals(Some(Healthy), Some(Healthy), Some("OK"), 0));
        assert_eq!(verdict, (HealthClassification::Healthy, "healthy-and-error-free"));
    }

    #[test]
    fn volume_warning_outranks_error_tally() {
        for errors in [0, 1, 40] {
            let (verdict, _) = classify_health(&signals(Some(Healthy), Some(Warning), Some("OK"), errors));
            assert_eq!(verdict, HealthClassification::Warning);
        }
    }

    #[test]
    fn warning_outranks_unhealthy() {
        let (verdict, _) = classify_health(&signals(Some(Unhealthy), Some(Warning), Some("OK"), 0));
        assert_eq!(verdict, HealthClassification::Warning);
    }

    #[test]
    fn unhealthy_disk_is_failed() {
        let (verdict, _) = classify_health(&signals(Some(Unhealthy), Some(Healthy), Some("OK"), 3));
        assert_eq!(verdict, HealthClassification::Failed);
    }

    #[test]
    fn non_ok_operational_status_is_offline() {
        let (verdict, rule) =
            classify_health(&signals(Some(Healthy), Some(Healthy), Some("Degraded"), 2));
        assert_eq!(verdict, HealthClassification::Offline);
        assert_eq!(rule, "not-operational");
        assert!(verdict.is_failed());
    }

    #[test]
    fn historical_errors_on_healthy_disk_surface_as_errors() {
        let (verdict, _) = classify_health(&signals(Some(Healthy), Some(Healthy), Some("OK"), 5));
        assert_eq!(verdict, HealthClassification::Errors);
    }

    #[test]
    fn all_absent_signals_are_unknown() {
        let verdict = classify_health(&HealthSignals::default());
        assert_eq!(verdict, (HealthClassification::Unknown, FALLBACK_RULE));
    }

    #[test]
    fn absent_disk_health_cannot_confirm_healthy() {
        let (verdict, _) = classify_health(&signals(None, Some(Healthy), Some("OK"), 0));
        assert_eq!(verdict, HealthClassification::Unknown);
    }

    #[test]
    fn absent_operational_status_is_not_offline() {
        let (verdict, _) = classify_health(&signals(Some(Healthy), None, None, 0));
        assert_eq!(verdict, HealthClassification::Unknown);
    }

    #[test]
    fn volume_signal_applies_without_a_disk() {
        let (verdict, _) = classify_health(&signals(None, Some(Unhealthy), Some("OK"), 0));
        assert_eq!(verdict, HealthClassification::Failed);
    }

    #[test]
    fn tier_boundaries_fall_into_the_lower_tier() {
        assert_eq!(tier_for_latency(0.99), PerformanceTier::Excellent);
        assert_eq!(tier_for_latency(1.0), PerformanceTier::Good);
        assert_eq!(tier_for_latency(4.99), PerformanceTier::Good);
        assert_eq!(tier_for_latency(5.0), PerformanceTier::Fair);
        assert_eq!(tier_for_latency(15.0), PerformanceTier::Poor);
        assert_eq!(tier_for_latency(120.0), PerformanceTier::Poor);
    }

    #[test]
    fn tier_uses_mean_of_read_and_write() {
        assert_eq!(grade_performance(&latencies(Some(0.4), Some(0.8))), PerformanceTier::Excellent);
        assert_eq!(grade_performance(&latencies(Some(0.5), Some(1.5))), PerformanceTier::Good);
        assert_eq!(grade_performance(&latencies(Some(2.0), Some(30.0))), PerformanceTier::Poor);
    }

    #[test]
    fn tier_unavailable_without_both_latencies() {
        assert_eq!(grade_performance(&latencies(Some(0.4), None)), PerformanceTier::Unavailable);
        assert_eq!(grade_performance(&latencies(None, Some(0.4))), PerformanceTier::Unavailable);
        assert_eq!(grade_performance(&DiskMetrics::default()), PerformanceTier::Unavailable);
    }
}

//! Alert Table Row

use crate::PrometheusLink;
use burnrate::{
    exhaustion_ms, format_current, format_duration, threshold, threshold_formula, to_fixed,
};
use objectives::{Alert, Objective, WindowSample};
use serde::Serialize;

/// Tooltip on the exhaustion column
pub const EXHAUSTION_TOOLTIP: &str =
    "If this alert is firing, the entire Error Budget can be burnt within that time frame.";

/// Display values of one alert's summary row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRow {
    pub state: &'static str,
    pub severity: String,
    /// Time until the error budget is gone at this alert's burn rate
    pub exhaustion: String,
    pub exhaustion_tooltip: &'static str,
    /// Threshold with three decimals
    pub threshold: String,
    /// How the threshold is derived, e.g. `14 * (1 - 0.99)`
    pub threshold_tooltip: String,
    /// Current short window burn rate and window, e.g. `0.210 (5m)`
    pub short_burn: String,
    pub long_burn: String,
    #[serde(rename = "for")]
    pub for_duration: String,
    pub prometheus_url: String,
}

impl AlertRow {
    pub fn new(objective: &Objective, alert: &Alert, link: &PrometheusLink) -> Self {
        Self {
            state: alert.state.as_str(),
            severity: alert.severity.clone(),
            exhaustion: format_duration(exhaustion_ms(objective.window, alert.factor)),
            exhaustion_tooltip: EXHAUSTION_TOOLTIP,
            threshold: to_fixed(threshold(alert.factor, objective.target), 3),
            threshold_tooltip: threshold_formula(alert.factor, objective.target),
            short_burn: burn_text(&alert.short),
            long_burn: burn_text(&alert.long),
            for_duration: format_duration(alert.for_duration.as_millis() as f64),
            prometheus_url: link.for_alert(alert),
        }
    }
}

fn burn_text(sample: &WindowSample) -> String {
    format!(
        "{} ({})",
        format_current(&sample.current),
        format_duration(sample.window.as_millis() as f64)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use objectives::{AlertState, Current, Labels};
    use std::time::Duration;

    fn objective() -> Objective {
        Objective::new(Labels::new(), 0.99, Duration::from_secs(28 * 24 * 3600))
    }

    fn page_alert() -> Alert {
        Alert {
            labels: Labels::new(),
            state: AlertState::Firing,
            severity: "critical".into(),
            for_duration: Duration::from_secs(120),
            factor: 14.0,
            short: WindowSample::new(Duration::from_secs(300), Current::Value(0.21), "short"),
            long: WindowSample::new(Duration::from_secs(3600), Current::NoData, "long"),
        }
    }

    #[test]
    fn test_page_alert_row() {
        let link = PrometheusLink::parse("http://localhost:9090").unwrap();
        let row = AlertRow::new(&objective(), &page_alert(), &link);

        assert_eq!(row.state, "firing");
        assert_eq!(row.severity, "critical");
        assert_eq!(row.exhaustion, "2d");
        assert_eq!(row.threshold, "0.140");
        assert_eq!(row.threshold_tooltip, "14 * (1 - 0.99)");
        assert_eq!(row.short_burn, "0.210 (5m)");
        assert_eq!(row.long_burn, "NaN (1h)");
        assert_eq!(row.for_duration, "2m");
        assert_eq!(
            row.prometheus_url,
            "http://localhost:9090/graph?g0.expr=long&g0.tab=0&g1.expr=short&g1.tab=0"
        );
    }

    #[test]
    fn test_not_computed_is_zero() {
        let mut alert = page_alert();
        alert.state = AlertState::Inactive;
        alert.short.current = Current::NotComputed;
        let link = PrometheusLink::parse("http://localhost:9090").unwrap();

        let row = AlertRow::new(&objective(), &alert, &link);
        assert_eq!(row.state, "inactive");
        assert_eq!(row.short_burn, "0.000 (5m)");
    }

    #[test]
    fn test_zero_factor_never_exhausts() {
        let mut alert = page_alert();
        alert.factor = 0.0;
        let link = PrometheusLink::parse("http://localhost:9090").unwrap();

        let row = AlertRow::new(&objective(), &alert, &link);
        assert_eq!(row.exhaustion, "∞");
        assert_eq!(row.threshold, "0.000");
    }
}

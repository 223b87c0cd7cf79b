//! Stable Alert Identity
//!
//! Rows and their graphs are matched across alert list refreshes by what the
//! alert is, not by where it sits in the list.

use objectives::{Alert, Labels};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Identity of one alert row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AlertKey {
    /// Objective labels merged with the alert's own labels
    selector: String,
    severity: String,
    short: Duration,
    long: Duration,
    /// Position among alerts that agree on everything above
    ordinal: usize,
}

impl AlertKey {
    /// Keys for a whole alert list, in list order
    pub fn for_alerts(objective: &Labels, alerts: &[Alert]) -> Vec<AlertKey> {
        let mut seen: HashMap<(String, String, Duration, Duration), usize> = HashMap::new();

        alerts
            .iter()
            .map(|alert| {
                let selector = objective.merge(&alert.labels).selector();
                let identity = (
                    selector,
                    alert.severity.clone(),
                    alert.short.window,
                    alert.long.window,
                );
                let ordinal = seen.entry(identity.clone()).or_insert(0);
                let key = AlertKey {
                    selector: identity.0,
                    severity: identity.1,
                    short: identity.2,
                    long: identity.3,
                    ordinal: *ordinal,
                };
                *ordinal += 1;
                key
            })
            .collect()
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn severity(&self) -> &str {
        &self.severity
    }

    pub fn windows(&self) -> (Duration, Duration) {
        (self.short, self.long)
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}s/{}s",
            self.selector,
            self.severity,
            self.short.as_secs(),
            self.long.as_secs()
        )?;
        if self.ordinal > 0 {
            write!(f, "#{}", self.ordinal)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objectives::{AlertState, Current, WindowSample};

    fn alert(severity: &str, short: u64, long: u64, state: AlertState) -> Alert {
        Alert {
            labels: Labels::new().with("job", "api"),
            state,
            severity: severity.into(),
            short: WindowSample::new(Duration::from_secs(short), Current::NotComputed, ""),
            long: WindowSample::new(Duration::from_secs(long), Current::NotComputed, ""),
            ..Default::default()
        }
    }

    #[test]
    fn test_key_ignores_state_and_position() {
        let objective = Labels::new().with("__name__", "api");
        let first = AlertKey::for_alerts(
            &objective,
            &[
                alert("critical", 300, 3600, AlertState::Firing),
                alert("warning", 7200, 86400, AlertState::Inactive),
            ],
        );
        let second = AlertKey::for_alerts(
            &objective,
            &[
                alert("warning", 7200, 86400, AlertState::Firing),
                alert("critical", 300, 3600, AlertState::Pending),
            ],
        );

        assert_eq!(first[0], second[1]);
        assert_eq!(first[1], second[0]);
        assert_eq!(first[0].selector(), r#"{__name__="api", job="api"}"#);
    }

    #[test]
    fn test_duplicates_get_ordinals() {
        let objective = Labels::new();
        let keys = AlertKey::for_alerts(
            &objective,
            &[
                alert("critical", 300, 3600, AlertState::Firing),
                alert("critical", 300, 3600, AlertState::Firing),
            ],
        );
        assert_ne!(keys[0], keys[1]);
        assert_eq!(keys[0].to_string(), r#"{job="api"}/critical/300s/3600s"#);
        assert_eq!(keys[1].to_string(), r#"{job="api"}/critical/300s/3600s#1"#);
    }
}

//! Outbound Prometheus Links

use crate::AlertingError;
use objectives::Alert;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Left as is by `encodeURIComponent`; everything else is escaped
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds Prometheus graph links showing an alert's long and short query
#[derive(Debug, Clone, PartialEq)]
pub struct PrometheusLink {
    graph: Url,
}

impl PrometheusLink {
    pub fn new(base: &Url) -> Result<Self, AlertingError> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let graph = base
            .join("graph")
            .map_err(|e| AlertingError::InvalidUrl(e.to_string()))?;
        Ok(Self { graph })
    }

    pub fn parse(base: &str) -> Result<Self, AlertingError> {
        let base = Url::parse(base).map_err(|e| AlertingError::InvalidUrl(e.to_string()))?;
        Self::new(&base)
    }

    /// Two panels: `g0` is the long window query, `g1` the short one.
    ///
    /// Queries are percent-encoded as URI components, so spaces become `%20`.
    pub fn for_alert(&self, alert: &Alert) -> String {
        format!(
            "{}?g0.expr={}&g0.tab=0&g1.expr={}&g1.tab=0",
            self.graph,
            utf8_percent_encode(&alert.long.query, QUERY_COMPONENT),
            utf8_percent_encode(&alert.short.query, QUERY_COMPONENT),
        )
    }
}

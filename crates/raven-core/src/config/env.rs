//! Environment variables understood by [`ConfigBuilder::apply_env`].

use super::{parse_duration, ConfigBuilder, ConfigError};

/// Comma-separated backend endpoint URLs.
pub const ENV_RAVEN_URL: &str = "RAVEN_URL";
pub const ENV_FLOW_ID: &str = "FLOW_ID";
pub const ENV_WORKER_ID: &str = "WORKER_ID";
/// Consume bound, e.g. `30s`.
pub const ENV_CONSUME_TIMEOUT: &str = "CONSUME_TIMEOUT";
pub const ENV_MAX_INTAKE: &str = "MAX_INTAKE";

impl ConfigBuilder {
    /// Override values with those set in the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Override values with those returned by `lookup`; unset or empty
    /// variables leave the current value alone.
    pub fn apply_vars<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(urls) = get(ENV_RAVEN_URL) {
            self = self.endpoints(&urls);
        }
        if let Some(flow_id) = get(ENV_FLOW_ID) {
            self = self.flow_id(flow_id);
        }
        if let Some(worker_id) = get(ENV_WORKER_ID) {
            self = self.worker_id(worker_id);
        }
        if let Some(timeout) = get(ENV_CONSUME_TIMEOUT) {
            self = self.consume_timeout(parse_duration(&timeout)?);
        }
        if let Some(n) = get(ENV_MAX_INTAKE) {
            let n = n.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                name: ENV_MAX_INTAKE,
                value: n.clone(),
            })?;
            self = self.max_intake(n);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::collections::HashMap;
    use std::time::Duration;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn full_environment_builds() {
        let cfg = Config::builder()
            .apply_vars(vars(&[
                ("RAVEN_URL", "http://a:1,http://b:2,http://c:3"),
                ("FLOW_ID", "flow-1"),
                ("WORKER_ID", "worker-1"),
                ("CONSUME_TIMEOUT", "200ms"),
                ("MAX_INTAKE", "10"),
            ]))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(cfg.endpoints().len(), 3);
        assert_eq!(cfg.flow_id(), "flow-1");
        assert_eq!(cfg.worker_id(), "worker-1");
        assert_eq!(cfg.consume_timeout(), Some(Duration::from_millis(200)));
        assert_eq!(cfg.max_intake(), Some(10));
    }

    #[test]
    fn unset_variables_keep_existing_values() {
        let cfg = Config::builder()
            .endpoint("http://file:1")
            .flow_id("from-file")
            .worker_id("w")
            .apply_vars(vars(&[("FLOW_ID", ""), ("WORKER_ID", "from-env")]))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(cfg.endpoints()[0].host_str(), Some("file"));
        assert_eq!(cfg.flow_id(), "from-file");
        assert_eq!(cfg.worker_id(), "from-env");
    }

    #[test]
    fn bad_values_are_reported() {
        let err = Config::builder()
            .apply_vars(vars(&[("CONSUME_TIMEOUT", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration(_)));

        let err = Config::builder()
            .apply_vars(vars(&[("MAX_INTAKE", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { name: "MAX_INTAKE", .. }));
    }
}

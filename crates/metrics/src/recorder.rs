//! Metrics recorder initialization.

use std::net::SocketAddr;

use tracing::{info, warn};

use crate::{Error, Result};

/// Configuration for the metrics system.
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorderConfig {
    /// Whether metrics collection is enabled
    pub enabled: bool,
    /// Address for the Prometheus `/metrics` listener
    pub listen: String,
    /// Global labels to add to all metrics
    pub global_labels: Vec<(String, String)>,
}

/// Initialize the metrics system.
///
/// Must be called from within a Tokio runtime, once, at startup. When the
/// `prometheus` feature is disabled this only logs and returns.
pub fn init_metrics(config: MetricsRecorderConfig) -> Result<()> {
    if !config.enabled {
        info!("metrics collection is disabled");
        return Ok(());
    }

    let addr: SocketAddr = config
        .listen
        .parse()
        .map_err(|source| Error::InvalidListen {
            address: config.listen.clone(),
            source,
        })?;

    #[cfg(feature = "prometheus")]
    {
        install_prometheus(addr, config.global_labels)?;
        info!(%addr, "prometheus metrics exporter listening");
    }

    #[cfg(not(feature = "prometheus"))]
    {
        let _ = config.global_labels;
        warn!(%addr, "metrics enabled in config but the prometheus feature is not compiled in");
    }

    Ok(())
}

#[cfg(feature = "prometheus")]
fn install_prometheus(addr: SocketAddr, global_labels: Vec<(String, String)>) -> Result<()> {
    use {
        crate::{buckets, scheduler},
        metrics_exporter_prometheus::{Matcher, PrometheusBuilder},
    };

    let mut builder = PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full(scheduler::DISPATCH_LAG_SECONDS.to_string()),
            buckets::DISPATCH_LAG,
        )?;

    for (key, value) in global_labels {
        builder = builder.add_global_label(key, value);
    }

    if let Err(e) = builder.install() {
        warn!(error = %e, "failed to install prometheus exporter");
        return Err(e.into());
    }
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_is_a_no_op() {
        init_metrics(MetricsRecorderConfig::default()).unwrap();
    }

    #[test]
    fn invalid_listen_address_is_rejected() {
        let err = init_metrics(MetricsRecorderConfig {
            enabled: true,
            listen: "not-an-address".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidListen { .. }));
    }
}

use metrics_exporter_prometheus::PrometheusHandle;
use scheme_engine::workflows::scheme::SchemeSettings;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) settings: Arc<SchemeSettings>,
}

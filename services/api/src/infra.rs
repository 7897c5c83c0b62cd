use cpi_report::config::AppConfig;
use cpi_report::error::AppError;
use cpi_report::sources::{FallbackSource, KosisSource, LocalWorkbookSource};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// KOSIS first, then the bundled workbook when the payload cannot be used.
pub(crate) type ConsumerSource = FallbackSource<KosisSource, LocalWorkbookSource>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) sources: Arc<ReportSources>,
    pub(crate) upload_limit: usize,
}

/// Table sources shared by every request.
pub(crate) struct ReportSources {
    pub(crate) workbook: LocalWorkbookSource,
    pub(crate) consumer: ConsumerSource,
}

impl ReportSources {
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let workbook = local_workbook(config);
        let kosis = KosisSource::new(
            config.kosis.api_url.clone(),
            config.kosis.api_key.clone(),
            config.kosis.timeout,
            config.dataset.total_index_label.clone(),
        )?;
        Ok(Self {
            consumer: FallbackSource::new(kosis, workbook.clone()),
            workbook,
        })
    }
}

pub(crate) fn local_workbook(config: &AppConfig) -> LocalWorkbookSource {
    LocalWorkbookSource::new(config.dataset.path.clone())
        .with_sheet(config.dataset.sheet.clone())
        .with_layout(config.dataset.layout())
}

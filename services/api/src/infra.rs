use arc_directory::config::DirectoryConfig;
use arc_directory::directory::{
    DirectoryService, ImportSummary, InMemoryDirectory, ProviderImportError, ProviderImporter,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn directory_service() -> DirectoryService<InMemoryDirectory> {
    DirectoryService::new(Arc::new(InMemoryDirectory::default()))
}

/// Load the configured seed export, if any, into a fresh directory.
pub(crate) fn seed_directory(
    service: &DirectoryService<InMemoryDirectory>,
    config: &DirectoryConfig,
) -> Result<Option<ImportSummary>, ProviderImportError> {
    match &config.seed_csv {
        Some(path) => ProviderImporter::from_path(path, service).map(Some),
        None => Ok(None),
    }
}

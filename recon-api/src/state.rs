use recon_catalog::{CatalogSource, ServiceCatalog};
use recon_core::selection::SelectionState;
use recon_core::session::SessionStore;
use recon_core::sink::MappingSink;
use recon_mapping::ExportMachine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub source: Arc<dyn CatalogSource>,
    pub sink: Arc<dyn MappingSink>,
    pub catalog: Arc<RwLock<ServiceCatalog>>,
    pub selections: Arc<RwLock<SelectionState>>,
    pub machine: Arc<RwLock<ExportMachine>>,
    pub submit_delay: Duration,
}

use std::sync::Arc;

use fieldday_core::storage::ObjectStore;
use fieldday_core::store::{MediaCatalog, YearConfigStore};

use crate::config::ServerConfig;
use crate::gallery::{AccessGuard, AssetReconciler, CatalogQueryService, UploadCoordinator};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (everything is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Year configuration (gallery protection).
    pub years: Arc<dyn YearConfigStore>,
    /// Media catalog.
    pub catalog: Arc<dyn MediaCatalog>,
    /// Object store holding the gallery assets.
    pub objects: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn access_guard(&self) -> AccessGuard {
        AccessGuard::new(Arc::clone(&self.years))
    }

    pub fn upload_coordinator(&self) -> UploadCoordinator {
        UploadCoordinator::new(Arc::clone(&self.catalog), Arc::clone(&self.objects))
    }

    pub fn reconciler(&self) -> AssetReconciler {
        AssetReconciler::new(Arc::clone(&self.catalog), Arc::clone(&self.objects))
    }

    pub fn catalog_service(&self) -> CatalogQueryService {
        CatalogQueryService::new(Arc::clone(&self.catalog), Arc::clone(&self.objects))
    }
}

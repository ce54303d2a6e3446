use psdeck_core::CatalogUnavailable;
use psdeck_core::ScriptDescriptor;

use crate::service::RemoteService;

/// Always goes to the service; the caller keeps the last good result.
pub fn fetch_catalog(
    service: &dyn RemoteService,
) -> Result<Vec<ScriptDescriptor>, CatalogUnavailable> {
    match service.list_scripts() {
        Ok(scripts) => {
            tracing::debug!(count = scripts.len(), "catalog fetched");
            Ok(scripts)
        }
        Err(err) => {
            tracing::warn!(service = %service.describe(), error = %err, "catalog fetch failed");
            Err(CatalogUnavailable::new(err.to_string()))
        }
    }
}

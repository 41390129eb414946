use crate::clustering::domain::identity_resolver::IdentityResolver;
use crate::shared::settings::{GroupingSettings, Strategy};

use super::batch_resolver::BatchResolver;
use super::incremental_resolver::IncrementalResolver;

/// Creates the resolver the settings ask for. The strategy is fixed for the
/// whole run.
pub fn create_resolver(settings: &GroupingSettings) -> Box<dyn IdentityResolver> {
    match settings.strategy {
        Strategy::Incremental => {
            log::info!("Using incremental resolver (tolerance={})", settings.tolerance);
            Box::new(IncrementalResolver::new(settings.tolerance))
        }
        Strategy::Batch => {
            log::info!(
                "Using batch resolver (distance_threshold={}, merge_threshold={})",
                settings.distance_threshold,
                settings.merge_threshold
            );
            Box::new(BatchResolver::new(
                settings.distance_threshold,
                settings.merge_threshold,
            ))
        }
    }
}

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::engine::{price_all_units, PricingRequest};
use super::repository::{CarryForwardRecord, CarryForwardRepository, RepositoryError};
use super::result::PricingRun;

/// Runs the engine for a property, reading and writing its carry-forward record.
pub struct PricingService<R> {
    repository: Arc<R>,
}

impl<R> PricingService<R>
where
    R: CarryForwardRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Price a batch for `property_id`.
    ///
    /// Stored baselines fill gaps in the request context when carry-forward is
    /// enabled. With `commit`, the run's baselines overwrite the stored record.
    pub fn run(
        &self,
        property_id: &str,
        request: PricingRequest,
        commit: bool,
    ) -> Result<PricingRun, PricingServiceError> {
        let PricingRequest {
            units,
            config,
            mut context,
        } = request;

        if config.enable_carry_forward {
            if let Some(record) = self.repository.load(property_id)? {
                context.apply_carry_forward(&record);
            }
        }

        let run = price_all_units(PricingRequest {
            units,
            config,
            context,
        });

        if commit {
            let record = run.carry_forward_record(Utc::now());
            info!(
                property_id,
                units = record.units.len(),
                floorplans = record.fp_baselines.len(),
                "committing carry-forward baselines"
            );
            self.repository.save(property_id, record)?;
        }

        Ok(run)
    }

    pub fn carry_forward(
        &self,
        property_id: &str,
    ) -> Result<Option<CarryForwardRecord>, PricingServiceError> {
        Ok(self.repository.load(property_id)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PricingServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

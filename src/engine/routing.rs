use uuid::Uuid;

use crate::engine::lifecycle::LifecycleError;
use crate::models::shipment::Stop;

/// Validates a routing plan before a shipment is created.
///
/// A stop is either a waypoint or the destination, never both: reaching the
/// destination is modeled as clearing the end of the stop list, so no stop
/// may carry the destination branch id. Repeated visits to the same branch
/// (hub round-trips) are legal.
pub fn validate_stops(stops: &[Stop], destination_branch: Uuid) -> Result<(), LifecycleError> {
    if stops.is_empty() {
        return Err(LifecycleError::Validation(
            "routing plan requires at least one stop".to_string(),
        ));
    }

    for (index, stop) in stops.iter().enumerate() {
        if stop.arrival > stop.departure {
            return Err(LifecycleError::Validation(format!(
                "stop {index}: arrival is after departure"
            )));
        }
        if stop.branch_id == destination_branch {
            return Err(LifecycleError::Validation(format!(
                "stop {index} duplicates the destination branch"
            )));
        }
    }

    Ok(())
}

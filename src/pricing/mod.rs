use crate::engine::lifecycle::LifecycleError;
use crate::models::booking::ServiceTier;
use crate::models::package::PackageType;

const STANDARD_BASE: f64 = 100.0;
const EXPRESS_BASE: f64 = 200.0;
const SAME_DAY_BASE: f64 = 300.0;
const WEIGHT_SURCHARGE_PER_KG: f64 = 10.0;

/// Deterministic amount for a booking: `round((base + weight * 10) * multiplier)`
/// in currency-agnostic integer units. Pure; called on every edit of
/// tier/weight/type, not just at submit.
pub fn compute_amount(
    tier: ServiceTier,
    weight_kg: f64,
    package_type: &PackageType,
) -> Result<i64, LifecycleError> {
    if weight_kg < 0.0 || !weight_kg.is_finite() {
        return Err(LifecycleError::Validation(format!(
            "invalid weight: {weight_kg}"
        )));
    }

    let base = base_amount(tier);
    let surcharge = weight_kg * WEIGHT_SURCHARGE_PER_KG;
    let amount = (base + surcharge) * type_multiplier(package_type);

    Ok(amount.round() as i64)
}

fn base_amount(tier: ServiceTier) -> f64 {
    match tier {
        ServiceTier::Standard => STANDARD_BASE,
        ServiceTier::Express => EXPRESS_BASE,
        ServiceTier::SameDay => SAME_DAY_BASE,
    }
}

/// Unknown package types degrade to the default multiplier rather than
/// failing, so intake never blocks on an unrecognized type.
fn type_multiplier(package_type: &PackageType) -> f64 {
    match package_type {
        PackageType::Document => 1.0,
        PackageType::Parcel => 1.2,
        PackageType::Box => 1.5,
        PackageType::Envelope => 1.1,
        PackageType::Other(_) => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::compute_amount;
    use crate::models::booking::ServiceTier;
    use crate::models::package::PackageType;

    #[test]
    fn standard_document_two_kg_prices_at_120() {
        let amount = compute_amount(ServiceTier::Standard, 2.0, &PackageType::Document).unwrap();
        assert_eq!(amount, 120);
    }

    #[test]
    fn express_box_five_kg_prices_at_375() {
        let amount = compute_amount(ServiceTier::Express, 5.0, &PackageType::Box).unwrap();
        assert_eq!(amount, 375);
    }

    #[test]
    fn unknown_package_type_uses_default_multiplier() {
        let known = compute_amount(ServiceTier::SameDay, 1.0, &PackageType::Document).unwrap();
        let unknown = compute_amount(
            ServiceTier::SameDay,
            1.0,
            &PackageType::Other("crate".to_string()),
        )
        .unwrap();
        assert_eq!(known, unknown);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let result = compute_amount(ServiceTier::Standard, -0.5, &PackageType::Parcel);
        assert!(result.is_err());
    }

    #[test]
    fn pricing_is_deterministic_and_non_negative() {
        for tier in [ServiceTier::Standard, ServiceTier::Express, ServiceTier::SameDay] {
            for weight in [0.0, 0.3, 7.5, 120.0] {
                let first = compute_amount(tier, weight, &PackageType::Envelope).unwrap();
                let second = compute_amount(tier, weight, &PackageType::Envelope).unwrap();
                assert_eq!(first, second);
                assert!(first >= 0);
            }
        }
    }
}

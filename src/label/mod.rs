use crate::models::booking::Booking;
use crate::models::shipment::Shipment;

/// Plain-text shipping label for a finalized shipment. Pure function of the
/// booking and shipment; printable rendering (PDF, barcode) happens in a
/// collaborator outside this service.
pub fn render_label(booking: &Booking, shipment: &Shipment) -> String {
    let mut lines = vec![
        format!("TRACKING {}", shipment.tracking_no),
        format!("BOOKING  {}", booking.booking_no),
        format!("METHOD   {:?}", shipment.shipping_method),
        String::new(),
        format!("FROM  {}", booking.pickup_party.name),
        format!("      {}", booking.pickup_party.address.line1),
        format!(
            "      {} {} {}",
            booking.pickup_party.address.city,
            booking.pickup_party.address.state,
            booking.pickup_party.address.postal_code
        ),
        String::new(),
        format!("TO    {}", booking.delivery_party.name),
        format!("      {}", booking.delivery_party.address.line1),
        format!(
            "      {} {} {}",
            booking.delivery_party.address.city,
            booking.delivery_party.address.state,
            booking.delivery_party.address.postal_code
        ),
        String::new(),
        format!("ROUTE {} stop(s), destination {}", shipment.stops.len(), shipment.destination_branch),
        format!("ETA   {}", shipment.estimated_delivery),
        format!("COD   {}", booking.billable_amount()),
    ];

    if let Some(notes) = &shipment.notes {
        lines.push(format!("NOTE  {notes}"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::render_label;
    use crate::engine::lifecycle::{create_booking, create_shipment, NewBooking, NewShipment};
    use crate::models::booking::{BookingOrigin, BookingStatus, PaymentMethod, ServiceTier};
    use crate::models::package::{PackageDescriptor, PackageType};
    use crate::models::party::{Address, Party};
    use crate::models::shipment::{ShippingMethod, Stop};

    #[test]
    fn label_carries_tracking_and_parties() {
        let party = |name: &str| Party {
            name: name.to_string(),
            phone: "555-0101".to_string(),
            address: Address {
                line1: "1 Depot Way".to_string(),
                line2: None,
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                postal_code: "62701".to_string(),
            },
        };

        let mut booking = create_booking(NewBooking {
            service_tier: ServiceTier::Express,
            package: PackageDescriptor {
                weight_kg: 1.0,
                length_cm: 10.0,
                width_cm: 10.0,
                height_cm: 10.0,
                quantity: 1,
                declared_value: 100,
                description: "gift".to_string(),
                package_type: PackageType::Parcel,
            },
            pickup_party: party("Ada"),
            delivery_party: party("Grace"),
            payment_method: PaymentMethod::Cash,
            origin: BookingOrigin::Branch {
                branch_id: Uuid::from_u128(1),
            },
            override_amount: None,
        })
        .unwrap();
        booking.status = BookingStatus::PickedUp;

        let (_, shipment) = create_shipment(
            &booking,
            NewShipment {
                origin_branch: Uuid::from_u128(1),
                destination_branch: Uuid::from_u128(2),
                stops: vec![Stop {
                    branch_id: Uuid::from_u128(3),
                    arrival: Utc.with_ymd_and_hms(2025, 3, 15, 10, 0, 0).unwrap(),
                    departure: Utc.with_ymd_and_hms(2025, 3, 15, 11, 0, 0).unwrap(),
                }],
                shipping_method: ShippingMethod::Express,
                estimated_delivery: chrono::NaiveDate::from_ymd_opt(2025, 3, 18).unwrap(),
                notes: None,
                tracking_no: None,
            },
        )
        .unwrap();

        let label = render_label(&booking, &shipment);
        assert!(label.contains(&booking.booking_no));
        assert!(label.contains("Ada"));
        assert!(label.contains("Grace"));
        assert!(label.contains("1 stop(s)"));
    }
}

use tracing::{info, warn};

use crate::models::booking::Booking;

/// Outbound customer messaging. Invoked fire-and-forget after pickup
/// assignment and delivery; a failed notification is logged and never
/// affects lifecycle state.
pub trait Notifier: Send + Sync {
    fn notify(&self, booking: &Booking, message: &str) -> Result<(), String>;
}

pub fn send_best_effort(notifier: &dyn Notifier, booking: &Booking, message: &str) {
    if let Err(err) = notifier.notify(booking, message) {
        warn!(
            booking_no = %booking.booking_no,
            error = %err,
            "notification failed, continuing"
        );
    }
}

/// Default channel: log-only. A real deployment plugs an SMS/email gateway
/// behind the same trait.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, booking: &Booking, message: &str) -> Result<(), String> {
        info!(
            booking_no = %booking.booking_no,
            recipient = %booking.delivery_party.phone,
            message,
            "customer notification"
        );
        Ok(())
    }
}

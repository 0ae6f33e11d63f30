use crate::models::{Booking, Contact};

use super::Notification;

const CARD_STYLE: &str = "font-family: Arial, sans-serif; max-width: 600px; border: 1px solid #10B981; padding: 20px; border-radius: 10px;";

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn row(label: &str, value: Option<&str>) -> String {
    format!(
        "<p><strong>{label}:</strong> {}</p>",
        escape_html(value.unwrap_or("-"))
    )
}

fn booking_rows(booking: &Booking) -> String {
    [
        row("Name", Some(booking.name.as_str())),
        row("Email", Some(booking.email.as_str())),
        row("Phone", booking.phone.as_deref()),
        row("Service", booking.service.as_deref()),
        row("Date", Some(booking.date.as_str())),
        row("Time", Some(booking.time.as_str())),
    ]
    .concat()
}

pub fn new_booking_alert(operator: &str, booking: &Booking) -> Notification {
    Notification {
        to: operator.to_string(),
        subject: format!("New Appointment: {}", booking.name),
        html_body: format!(
            "<div style=\"{CARD_STYLE}\"><h2 style=\"color: #10B981;\">New Appointment Received</h2>{}</div>",
            booking_rows(booking)
        ),
    }
}

pub fn booking_confirmation(booking: &Booking, cancel_link: &str) -> Notification {
    Notification {
        to: booking.email.clone(),
        subject: format!("Your appointment on {} at {}", booking.date, booking.time),
        html_body: format!(
            "<div style=\"{CARD_STYLE}\"><h2 style=\"color: #10B981;\">Appointment Confirmed</h2>{}\
             <p>Need to cancel? <a href=\"{}\">Cancel this appointment</a></p></div>",
            booking_rows(booking),
            escape_html(cancel_link)
        ),
    }
}

pub fn cancellation_alert(operator: &str, booking: &Booking) -> Notification {
    Notification {
        to: operator.to_string(),
        subject: format!("Appointment Cancelled: {}", booking.name),
        html_body: format!(
            "<div style=\"{CARD_STYLE}\"><h2 style=\"color: #EF4444;\">Appointment Cancelled</h2>{}</div>",
            booking_rows(booking)
        ),
    }
}

pub fn inquiry_alert(operator: &str, contact: &Contact) -> Notification {
    let full_name = match contact.last_name.as_deref() {
        Some(last) if !last.is_empty() => format!("{} {last}", contact.first_name),
        _ => contact.first_name.clone(),
    };
    Notification {
        to: operator.to_string(),
        subject: format!("New Inquiry: {full_name}"),
        html_body: [
            row("Name", Some(full_name.as_str())),
            row("Email", contact.email.as_deref()),
            row("Service", contact.service.as_deref()),
            row("Message", contact.message.as_deref()),
        ]
        .concat(),
    }
}

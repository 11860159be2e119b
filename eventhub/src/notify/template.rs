//! Registration confirmation email content.

use crate::types::EventSummary;

/// Rendered confirmation email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationEmail {
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plain-text body.
    pub text: String,
}

impl RegistrationEmail {
    /// Render the confirmation for `recipient_name`, linking to the
    /// dashboard under `frontend_url`.
    #[must_use]
    pub fn render(recipient_name: &str, event: &EventSummary, frontend_url: &str) -> Self {
        let dashboard = format!("{}/dashboard", frontend_url.trim_end_matches('/'));
        let date = event.date.format("%A, %B %-d, %Y").to_string();
        let EventSummary {
            name,
            description,
            time,
            location,
            organizer,
            ..
        } = event;

        let html = format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Registration Confirmed</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2 style="color: #2563eb;">Registration Confirmed!</h2>
        <p>Hi {recipient_name},</p>
        <p>You have successfully registered for <strong>{name}</strong>.</p>
        <div style="background-color: #f3f4f6; padding: 16px; border-radius: 4px;">
            <p><strong>Date:</strong> {date}</p>
            <p><strong>Time:</strong> {time}</p>
            <p><strong>Location:</strong> {location}</p>
            <p><strong>Organizer:</strong> {organizer}</p>
        </div>
        <p>{description}</p>
        <p style="margin: 30px 0;">
            <a href="{dashboard}"
               style="display: inline-block; background-color: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px;">
                View My Registrations
            </a>
        </p>
        <p style="color: #666; font-size: 14px;">We look forward to seeing you there!</p>
    </div>
</body>
</html>
            "#
        );

        let text = format!(
            "Hi {recipient_name},\n\n\
             You have successfully registered for {name}.\n\n\
             Date: {date}\n\
             Time: {time}\n\
             Location: {location}\n\
             Organizer: {organizer}\n\n\
             {description}\n\n\
             View your registrations: {dashboard}\n"
        );

        Self {
            subject: format!("Registration Confirmed - {name}"),
            html,
            text,
        }
    }
}

//! Email and text message bodies

use shared::models::{Incident, Ticket};

use super::email::OutgoingEmail;

const FOOTER: &str = "SafeLive notification service";

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn or_na(value: &str) -> String {
    match value.trim() {
        "" => "N/A".to_string(),
        v => v.to_string(),
    }
}

fn coord(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// Shared HTML frame: heading, intro line and a label/value table
pub fn render_frame(title: &str, intro: &str, details: &[(&str, String)]) -> String {
    let rows: String = details
        .iter()
        .map(|(label, value)| {
            let text = if value.is_empty() { "N/A" } else { value.as_str() };
            let safe = escape_html(text);
            let cell = if text.starts_with("http://") || text.starts_with("https://") {
                format!(
                    "<a href='{safe}' style='color:#0f62fe;text-decoration:none' target='_blank'>{safe}</a>"
                )
            } else {
                safe
            };
            format!(
                "<tr><td style='padding:6px 10px;font-weight:600'>{}</td>\
                 <td style='padding:6px 10px'>{}</td></tr>",
                escape_html(label),
                cell
            )
        })
        .collect();

    format!(
        "<!doctype html>\
         <html><body style='margin:0;background:#f5f7fb;font-family:Arial,sans-serif'>\
         <table width='100%' cellpadding='0' cellspacing='0' style='padding:24px 0'>\
         <tr><td align='center'>\
         <table width='620' cellpadding='0' cellspacing='0' \
         style='max-width:620px;background:#ffffff;border-radius:8px;border:1px solid #e7ecf4'>\
         <tr><td style='padding:20px 24px;border-bottom:1px solid #edf1f7'>\
         <h2 style='margin:0;font-size:20px;color:#1b2733'>{}</h2></td></tr>\
         <tr><td style='padding:18px 24px;color:#243241;font-size:14px;line-height:1.6'>\
         <p style='margin:0 0 14px 0'>{}</p>\
         <table width='100%' cellpadding='0' cellspacing='0' style='border:1px solid #edf1f7;border-radius:6px'>\
         {rows}</table></td></tr>\
         <tr><td style='padding:14px 24px;background:#f8faff;color:#6d7a89;font-size:12px'>{FOOTER}</td></tr>\
         </table></td></tr></table></body></html>",
        escape_html(title),
        escape_html(intro),
    )
}

fn text_rows(details: &[(&str, String)]) -> String {
    details
        .iter()
        .map(|(label, value)| format!("{label}: {value}\n"))
        .collect()
}

// ========== Emails ==========

/// Stakeholder alert for a new incident
pub fn alert_email(to: &str, incident: &Incident) -> OutgoingEmail {
    let subject = "SafeLive Alert";
    let details = [
        ("Description", or_na(&incident.description)),
        ("Latitude", coord(incident.latitude)),
        ("Longitude", coord(incident.longitude)),
    ];
    OutgoingEmail {
        subject: subject.into(),
        to: to.into(),
        text: format!(
            "Issue Detected\n\n{}\nLogin to dashboard for details.",
            text_rows(&details)
        ),
        html: Some(render_frame(
            subject,
            "A new issue was detected and requires attention.",
            &details,
        )),
    }
}

/// Confirmation sent to the reporter of a new incident
pub fn incident_submitted_email(to: &str, incident: &Incident) -> OutgoingEmail {
    let subject = "SafeLive Incident Submitted";
    let details = [
        ("Incident ID", incident.id.clone()),
        ("Title", or_na(&incident.title)),
        ("Category", or_na(&incident.category)),
        (
            "Priority",
            incident
                .priority
                .map_or_else(|| "N/A".to_string(), |p| p.as_str().to_uppercase()),
        ),
        ("Status", incident.status.as_str().replace('_', " ")),
        ("Location", or_na(&incident.location)),
        ("Submitted At", incident.created_at.clone()),
    ];
    OutgoingEmail {
        subject: subject.into(),
        to: to.into(),
        text: format!(
            "Your incident report has been submitted successfully.\n\n{}\n\
             Keep this Incident ID for future tracking.",
            text_rows(&details)
        ),
        html: Some(render_frame(
            subject,
            "Your incident report was submitted successfully.",
            &details,
        )),
    }
}

/// Status/assignment change, sent to the reporter
pub fn ticket_update_email(to: &str, ticket: &Ticket) -> OutgoingEmail {
    let subject = "SafeLive Ticket Update";
    let details = [
        ("Title", or_na(&ticket.title)),
        ("Status", ticket.status.as_str().to_string()),
    ];
    OutgoingEmail {
        subject: subject.into(),
        to: to.into(),
        text: format!(
            "Your ticket has been updated.\n\n{}\nLogin to dashboard for details.",
            text_rows(&details)
        ),
        html: Some(render_frame(
            subject,
            "Your ticket status has changed.",
            &details,
        )),
    }
}

/// Reopen notice, sent to the assignee
pub fn ticket_reopened_email(to: &str, ticket: &Ticket, reopened_by: &str) -> OutgoingEmail {
    let subject = "SafeLive Ticket Reopened";
    let details = [
        ("Title", or_na(&ticket.title)),
        ("Ticket ID", ticket.id.clone()),
        ("Location", or_na(&ticket.location)),
        ("Reopened by", or_na(reopened_by)),
    ];
    OutgoingEmail {
        subject: subject.into(),
        to: to.into(),
        text: format!(
            "A ticket you resolved has been reopened by a supervisor.\n\n{}\n\
             Please review the ticket and resume work.",
            text_rows(&details)
        ),
        html: Some(render_frame(
            subject,
            "A ticket you resolved has been reopened by a supervisor.",
            &details,
        )),
    }
}

pub fn password_reset_email(to: &str, reset_link: &str, expire_minutes: i64) -> OutgoingEmail {
    let subject = "SafeLive Password Reset";
    let details = [
        ("Reset link", reset_link.to_string()),
        ("Expires in", format!("{expire_minutes} minutes")),
    ];
    OutgoingEmail {
        subject: subject.into(),
        to: to.into(),
        text: format!(
            "You requested a password reset.\n\n\
             Use this link to reset your password:\n{reset_link}\n\n\
             If you did not request this, you can ignore this email."
        ),
        html: Some(render_frame(
            subject,
            "A password reset request was received for your account.",
            &details,
        )),
    }
}

// ========== Text messages ==========

pub fn alert_text(incident: &Incident) -> String {
    format!(
        "SafeLive alert: {}. Location {}, {}.",
        incident.description,
        coord(incident.latitude),
        coord(incident.longitude)
    )
}

pub fn ticket_update_text(ticket: &Ticket) -> String {
    format!(
        "SafeLive ticket update: {} is now {}.",
        ticket.title, ticket.status
    )
}

pub fn ticket_reopened_text(ticket: &Ticket, reopened_by: &str) -> String {
    format!(
        "SafeLive: ticket \"{}\" was reopened by {}. Please resume work.",
        ticket.title, reopened_by
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_escapes_and_links() {
        let html = render_frame(
            "Title <b>",
            "intro & more",
            &[
                ("Name", "<script>".to_string()),
                ("Link", "https://safelive.in/x?a=1&b=2".to_string()),
                ("Empty", String::new()),
            ],
        );
        assert!(html.contains("Title &lt;b&gt;"));
        assert!(html.contains("intro &amp; more"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<a href='https://safelive.in/x?a=1&amp;b=2'"));
        assert!(html.contains(">N/A</td>"));
        assert!(html.contains(FOOTER));
    }

    #[test]
    fn test_password_reset_email() {
        let email = password_reset_email(
            "user@example.org",
            "https://safelive.in/reset-password?token=abc",
            30,
        );
        assert_eq!(email.subject, "SafeLive Password Reset");
        assert!(email.text.contains("https://safelive.in/reset-password?token=abc"));
        assert!(email.html.unwrap().contains("30 minutes"));
    }
}

//! Fire-and-forget email notifications
//!
//! Services hand a [`Notification`] to a [`Notifier`] and move on. The
//! production notifier queues it for a background worker that renders the
//! email and passes it to a [`Mailer`]; send failures are logged and dropped.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    mailer::{Mailer, OutgoingEmail},
    models::Event,
};

/// Event details quoted in emails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSummary {
    pub event_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub event_key: String,
    pub creator_name: String,
}

impl EventSummary {
    pub fn new(event: &Event, creator_name: impl Into<String>) -> Self {
        Self {
            event_id: event.id,
            name: event.name.clone(),
            date: event.date,
            event_key: event.event_key.clone(),
            creator_name: creator_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Sent to the creator once their event exists
    EventCreated { to: String, event: EventSummary },
    /// Sent to a guest with links to answer their RSVP
    RsvpInvite {
        to: String,
        event: EventSummary,
        rsvp_id: Uuid,
    },
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::EventCreated { to, .. } | Notification::RsvpInvite { to, .. } => to,
        }
    }
}

#[derive(Debug, Error)]
#[error("Notification worker is not running")]
pub struct NotifyError;

pub trait Notifier: Send + Sync {
    /// Queue a notification; returns as soon as it is accepted
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Channel-backed [`Notifier`] drained by a single worker task
#[derive(Clone)]
pub struct MailQueue {
    tx: mpsc::UnboundedSender<Notification>,
}

impl MailQueue {
    /// Spawn the worker and return the queue feeding it.
    ///
    /// The worker stops once every queue handle has been dropped.
    pub fn start(mailer: Arc<dyn Mailer>, templates: EmailTemplates) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();

        let handle = tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                let email = templates.render(&notification);
                if let Err(e) = mailer.send(&email).await {
                    error!(to = %email.to, subject = %email.subject, "Failed to send email: {}", e);
                }
            }
            info!("Notification worker stopped");
        });

        (Self { tx }, handle)
    }
}

impl Notifier for MailQueue {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.tx.send(notification).map_err(|_| NotifyError)
    }
}

/// Renders notifications into HTML emails
#[derive(Debug, Clone)]
pub struct EmailTemplates {
    app_base_url: String,
}

impl EmailTemplates {
    pub fn new(app_base_url: impl Into<String>) -> Self {
        Self {
            app_base_url: app_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn dashboard_url(&self, event_id: Uuid) -> String {
        format!("{}/dashboard/{}", self.app_base_url, event_id)
    }

    pub fn rsvp_url(&self, rsvp_id: Uuid, answer: &str) -> String {
        format!("{}/rsvp/{}/{}", self.app_base_url, rsvp_id, answer)
    }

    pub fn render(&self, notification: &Notification) -> OutgoingEmail {
        match notification {
            Notification::EventCreated { to, event } => OutgoingEmail {
                to: to.clone(),
                subject: format!("Your Event Has Been Created: {}", event.name),
                html_body: self.event_created_body(event),
            },
            Notification::RsvpInvite { to, event, rsvp_id } => OutgoingEmail {
                to: to.clone(),
                subject: format!("You're Invited: {}", event.name),
                html_body: self.invite_body(event, *rsvp_id),
            },
        }
    }

    fn event_created_body(&self, event: &EventSummary) -> String {
        format!(
            r#"<html>
<body style="font-family: Arial, sans-serif; color: #333;">
  <h2>Hi {creator},</h2>
  <p>Your event <strong>{name}</strong> has been created.</p>
  <p><strong>Date:</strong> {date}</p>
  <p><strong>Event key:</strong> {key}</p>
  <p>Share the event key with your guests so they can find your event.</p>
  <p><a href="{dashboard}" style="background: #4f46e5; color: #fff; padding: 10px 16px; text-decoration: none; border-radius: 4px;">Open your dashboard</a></p>
</body>
</html>"#,
            creator = escape_html(&event.creator_name),
            name = escape_html(&event.name),
            date = format_date(event.date),
            key = escape_html(&event.event_key),
            dashboard = self.dashboard_url(event.event_id),
        )
    }

    fn invite_body(&self, event: &EventSummary, rsvp_id: Uuid) -> String {
        format!(
            r#"<html>
<body style="font-family: Arial, sans-serif; color: #333;">
  <h2>You're invited to {name}!</h2>
  <p><strong>{creator}</strong> would love to see you there.</p>
  <p><strong>Date:</strong> {date}</p>
  <p><strong>Event key:</strong> {key}</p>
  <p>Will you attend?</p>
  <p>
    <a href="{accept}" style="background: #16a34a; color: #fff; padding: 10px 16px; text-decoration: none; border-radius: 4px;">Accept</a>
    &nbsp;
    <a href="{decline}" style="background: #dc2626; color: #fff; padding: 10px 16px; text-decoration: none; border-radius: 4px;">Decline</a>
  </p>
</body>
</html>"#,
            name = escape_html(&event.name),
            creator = escape_html(&event.creator_name),
            date = format_date(event.date),
            key = escape_html(&event.event_key),
            accept = self.rsvp_url(rsvp_id, "accepted"),
            decline = self.rsvp_url(rsvp_id, "declined"),
        )
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

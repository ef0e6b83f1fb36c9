//! Notification Dispatcher
//!
//! Order status changes are announced to the buyer on two channels: an
//! in-app notification row and an email sent through the seller's own SMTP
//! credentials. Both run on a background worker fed by an unbounded queue,
//! so a slow or misconfigured mail relay never delays the HTTP response
//! that triggered it. Delivery failures are logged and dropped; the order
//! transition itself has already committed.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::mpsc;

use crate::db::models::OrderStatus;
use crate::db::repository::{AccountRepository, NotificationRepository};

/// SMTP relay settings (host/port only; per-seller credentials come from
/// the seller's account record)
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Disable outbound mail entirely (tests, local development)
    pub enabled: bool,
}

impl SmtpConfig {
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            enabled: std::env::var("SMTP_ENABLED")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(true),
        }
    }

    pub fn disabled() -> Self {
        Self {
            host: String::new(),
            port: 0,
            enabled: false,
        }
    }
}

/// One queued announcement of an order status change
#[derive(Debug, Clone)]
pub struct OrderStatusEvent {
    pub order_id: RecordId,
    pub buyer: RecordId,
    pub seller: RecordId,
    pub status: OrderStatus,
}

/// Handle for enqueueing notifications. Cheap to clone; dropping every
/// clone shuts the worker down after it drains the queue.
#[derive(Clone)]
pub struct NotifyService {
    tx: mpsc::UnboundedSender<OrderStatusEvent>,
}

impl NotifyService {
    /// Spawn the background worker and return its handle
    pub fn spawn(db: Surreal<Db>, smtp: SmtpConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = NotifyWorker {
            accounts: AccountRepository::new(db.clone()),
            notifications: NotificationRepository::new(db),
            smtp,
        };
        tokio::spawn(worker.run(rx));
        Self { tx }
    }

    /// Queue an order status announcement. Never blocks; a closed queue
    /// (server shutting down) is logged and ignored.
    pub fn order_status_changed(&self, event: OrderStatusEvent) {
        if self.tx.send(event).is_err() {
            tracing::warn!("notification queue closed, dropping event");
        }
    }
}

struct NotifyWorker {
    accounts: AccountRepository,
    notifications: NotificationRepository,
    smtp: SmtpConfig,
}

impl NotifyWorker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<OrderStatusEvent>) {
        tracing::info!("notification worker started");
        while let Some(event) = rx.recv().await {
            self.handle(event).await;
        }
        tracing::info!("notification worker stopped");
    }

    async fn handle(&self, event: OrderStatusEvent) {
        let message = format!(
            "Your order {} is now {}",
            event.order_id.key(),
            event.status
        );

        if let Err(e) = self
            .notifications
            .create(event.buyer.clone(), event.order_id.clone(), message.clone())
            .await
        {
            tracing::error!(order = %event.order_id, error = %e, "failed to record notification");
        }

        if let Err(e) = self.send_email(&event, &message).await {
            tracing::warn!(order = %event.order_id, error = %e, "order status email not sent");
        }
    }

    /// Email the buyer through the seller's relay account. Sellers without
    /// stored mail credentials simply skip this channel.
    async fn send_email(&self, event: &OrderStatusEvent, body: &str) -> Result<(), String> {
        if !self.smtp.enabled {
            return Ok(());
        }

        let creds = self
            .accounts
            .find_mail_credentials(&event.seller)
            .await
            .map_err(|e| e.to_string())?;
        let Some(creds) = creds else {
            tracing::debug!(seller = %event.seller, "seller has no mail credentials, skipping email");
            return Ok(());
        };
        let Some(app_password) = creds.smtp_app_password else {
            tracing::debug!(seller = %event.seller, "seller has no app password, skipping email");
            return Ok(());
        };

        let buyer = self
            .accounts
            .find_by_id(&event.buyer)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "buyer account not found".to_string())?;

        let sender_name = creds.store_name.as_deref().unwrap_or("Souk Marketplace");
        let from: Mailbox = format!("{} <{}>", sender_name, creds.email)
            .parse()
            .map_err(|e| format!("invalid sender address: {e}"))?;
        let to: Mailbox = format!("{} <{}>", buyer.name, buyer.email)
            .parse()
            .map_err(|e| format!("invalid recipient address: {e}"))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(format!("Order update: {}", event.status))
            .body(body.to_string())
            .map_err(|e| format!("failed to build email: {e}"))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.smtp.host)
            .map_err(|e| format!("smtp relay setup failed: {e}"))?
            .port(self.smtp.port)
            .credentials(Credentials::new(creds.email, app_password))
            .build();

        transport
            .send(email)
            .await
            .map_err(|e| format!("smtp send failed: {e}"))?;

        tracing::info!(order = %event.order_id, "order status email sent");
        Ok(())
    }
}

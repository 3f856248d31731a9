//! Order confirmation e-mails.
//!
//! When SMTP is configured, a confirmation is sent to the customer for every finalized order. Otherwise the
//! confirmation is only written to the log. Either way a failure here never touches the order itself.
use checkout_engine::{
    db_types::{Money, OrderItem},
    events::{EventHandlers, EventHooks, OrderAnnulledEvent, OrderFinalizedEvent},
};
use futures::future::BoxFuture;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
};
use log::*;
use thiserror::Error;

use crate::{config::EmailConfig, errors::ServerError};

pub const EMAIL_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
    #[error("Order {0} has no customer e-mail address")]
    NoRecipient(String),
}

#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: Mailbox,
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let credentials = Credentials::new(config.smtp_username.clone(), config.smtp_password.reveal().clone());
        let mailer =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?.credentials(credentials).build();
        let from_address =
            config.from_address.parse().map_err(|_| EmailError::InvalidAddress(config.from_address.clone()))?;
        Ok(Self { mailer, from_address })
    }

    pub async fn send_order_confirmation(&self, event: &OrderFinalizedEvent) -> Result<(), EmailError> {
        let order_id = event.order.order_id.as_str();
        let user = event.user.as_ref().ok_or_else(|| EmailError::NoRecipient(order_id.to_string()))?;
        let to: Mailbox = format!("{} <{}>", user.name, user.email)
            .parse()
            .map_err(|_| EmailError::InvalidAddress(user.email.clone()))?;
        let email = Message::builder()
            .from(self.from_address.clone())
            .to(to)
            .subject(format!("Your order {order_id} is confirmed"))
            .header(ContentType::TEXT_PLAIN)
            .body(confirmation_body(event))?;
        self.mailer.send(email).await?;
        Ok(())
    }
}

/// The plain text body of the confirmation e-mail.
pub fn confirmation_body(event: &OrderFinalizedEvent) -> String {
    let order = &event.order;
    let name = event.user.as_ref().map(|u| u.name.as_str()).unwrap_or("there");
    let lines = event.items.iter().map(item_line).collect::<Vec<_>>().join("\n");
    let payment = order.payment_method.as_deref().unwrap_or("Online");
    let address = event.address.as_ref().map(|a| a.to_string()).unwrap_or_else(|| "(address unavailable)".into());
    format!(
        "Hi {name},\n\nThank you for your order! We have received your payment and are getting your furniture \
         ready.\n\nOrder: {}\nPaid by: {payment}\n\n{lines}\n\nTotal: {}\n\nShipping to:\n{address}\n",
        order.order_id.as_str(),
        order.total_amount
    )
}

fn item_line(item: &OrderItem) -> String {
    let color = if item.color.is_empty() { String::new() } else { format!(" ({})", item.color) };
    let line = format!("  {} x product #{}{color} @ {}", item.quantity, item.product_id, item.price);
    match item.line_total() {
        Some(total) => format!("{line} = {total}"),
        None => line,
    }
}

/// Builds the hooks for order notifications. `None` gives log-only hooks.
pub fn create_email_event_handlers(config: Option<&EmailConfig>) -> Result<EventHandlers, ServerError> {
    let mut hooks = EventHooks::default();
    match config {
        Some(config) => {
            let service = EmailService::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
            info!("📧️ Order confirmations will be e-mailed via {}", config.smtp_host);
            hooks.on_order_finalized(move |ev| {
                let service = service.clone();
                Box::pin(async move {
                    match service.send_order_confirmation(&ev).await {
                        Ok(()) => info!("📧️ Confirmation for order {} sent", ev.order.order_id),
                        Err(e) => error!("📧️ Could not send the confirmation for order {}. {e}", ev.order.order_id),
                    }
                })
            });
        },
        None => {
            hooks.on_order_finalized(|ev| {
                info!("📧️ Order {} confirmed (e-mail disabled):\n{}", ev.order.order_id, confirmation_body(&ev));
                no_op()
            });
        },
    }
    hooks.on_order_annulled(|ev| {
        let OrderAnnulledEvent { order, status } = ev;
        info!("📧️ Order {} for user #{} is now {status}", order.order_id, order.user_id);
        no_op()
    });
    Ok(EventHandlers::new(EMAIL_EVENT_BUFFER_SIZE, hooks))
}

fn no_op() -> BoxFuture<'static, ()> {
    Box::pin(async {})
}

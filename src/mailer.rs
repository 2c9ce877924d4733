use std::time::Duration;

use axum::async_trait;
use tracing::{info, warn};

/// Outbound mail transport. Delivery is an external collaborator; the
/// application only depends on this trait.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> anyhow::Result<()>;
}

/// Transport that writes messages to the log instead of a wire. Used as the
/// default until a real transport is plugged in, and by tests.
pub struct LogMailer {
    pub from: String,
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> anyhow::Result<()> {
        info!(from = %self.from, %to, %subject, body_len = html_body.len(), "outbound mail");
        Ok(())
    }
}

/// Fire-and-forget send with a bounded wait. Registration and password-reset
/// requests must not fail or hang because the mail leg is slow; failures are
/// logged and swallowed.
pub async fn send_best_effort(
    mailer: &dyn Mailer,
    timeout: Duration,
    to: &str,
    subject: &str,
    html_body: &str,
) {
    match tokio::time::timeout(timeout, mailer.send(to, subject, html_body)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, %to, "mail send failed"),
        Err(_) => warn!(%to, "mail send timed out"),
    }
}

/// User-supplied names land inside HTML bodies and must not be able to inject
/// markup.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn verification_email(name: &str, verify_url: &str) -> (String, String) {
    let subject = "Confirmação de criação de conta - Põe na Conta".to_string();
    let body = format!(
        "<h3>Olá, {}!</h3>\
         <p>Para ativar sua conta, confirme seu e-mail clicando no link abaixo:</p>\
         <p><a href=\"{}\">Confirmar e-mail</a></p>\
         <p><em>Este link é válido por 20 minutos.</em></p>",
        escape_html(name),
        verify_url
    );
    (subject, body)
}

pub fn reset_email(name: &str, reset_url: &str) -> (String, String) {
    let subject = "Recuperação de senha - Põe na Conta".to_string();
    let body = format!(
        "<h3>Olá, {}!</h3>\
         <p>Recebemos um pedido de alteração de senha. Use o link abaixo:</p>\
         <p><a href=\"{}\">Alterar senha</a></p>\
         <p><em>Este link é válido por 20 minutos.</em></p>",
        escape_html(name),
        reset_url
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_in_names() {
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert('x')&lt;/script&gt;"
        );
        assert_eq!(escape_html("Ana & Bia"), "Ana &amp; Bia");
    }

    #[test]
    fn verification_body_contains_escaped_name_and_link() {
        let (subject, body) = verification_email("<b>João</b>", "https://x/verify?token=t");
        assert!(subject.contains("Põe na Conta"));
        assert!(body.contains("&lt;b&gt;João&lt;/b&gt;"));
        assert!(!body.contains("<b>João</b>"));
        assert!(body.contains("https://x/verify?token=t"));
    }

    #[tokio::test]
    async fn best_effort_send_swallows_failures() {
        struct FailingMailer;
        #[async_trait]
        impl Mailer for FailingMailer {
            async fn send(&self, _: &str, _: &str, _: &str) -> anyhow::Result<()> {
                anyhow::bail!("smtp down")
            }
        }
        // Must return despite the failure.
        send_best_effort(
            &FailingMailer,
            Duration::from_millis(100),
            "a@b.c",
            "s",
            "b",
        )
        .await;
    }

    #[tokio::test]
    async fn best_effort_send_bounds_slow_transports() {
        struct SlowMailer;
        #[async_trait]
        impl Mailer for SlowMailer {
            async fn send(&self, _: &str, _: &str, _: &str) -> anyhow::Result<()> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }
        }
        let start = std::time::Instant::now();
        send_best_effort(&SlowMailer, Duration::from_millis(50), "a@b.c", "s", "b").await;
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}

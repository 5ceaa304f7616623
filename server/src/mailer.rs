use tracing::info;

/// Outbound mail seam.  The server sends exactly two kinds of message
/// (activation links to registrants, takedown links to the admin), so the
/// surface stays minimal.
///
/// `send` reports whether the message was handed off; callers map a refusal
/// onto their endpoint's failure status.
pub trait Mailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> bool;
}

/// Mailer that writes messages to the log instead of an SMTP relay.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> bool {
        info!("MAIL to={} subject={:?}:\n{}", to, subject, body);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct RefusingMailer;

    impl Mailer for RefusingMailer {
        fn send(&self, _to: &str, _subject: &str, _body: &str) -> bool {
            false
        }
    }

    #[test]
    fn log_mailer_always_hands_off() {
        let mailer: Arc<dyn Mailer + Send + Sync> = Arc::new(LogMailer);
        assert!(mailer.send("a@b.co", "hello", "body"));
    }

    #[test]
    fn refusals_travel_through_the_trait_object() {
        let mailer: Arc<dyn Mailer + Send + Sync> = Arc::new(RefusingMailer);
        assert!(!mailer.send("a@b.co", "hello", "body"));
    }
}

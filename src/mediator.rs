//! User mediation for destructive decisions and terminal errors

/// Host-side prompt and message channel
pub trait Mediator: Send + Sync {
    /// Ask a yes/no question; true means yes
    fn confirm(&self, question: &str) -> bool;

    /// Surface a message the user should see
    fn notify(&self, message: &str);
}

/// Headless mediator: logs everything and answers questions with a preset
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMediator {
    pub assume_yes: bool,
}

impl LogMediator {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Mediator for LogMediator {
    fn confirm(&self, question: &str) -> bool {
        log::warn!(
            "{} [answering {}]",
            question,
            if self.assume_yes { "yes" } else { "no" }
        );
        self.assume_yes
    }

    fn notify(&self, message: &str) {
        log::error!("{}", message);
    }
}

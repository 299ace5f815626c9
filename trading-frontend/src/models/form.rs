/// Outcome of a form submission, rendered back into the page.
///
/// One value per form render; a page is never simultaneously failed and
/// succeeded. The transient "submitting" phase of the original flow is the
/// in-flight request itself here, so it has no rendered representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Idle,
    Succeeded(String),
    Failed(String),
}

impl FormState {
    pub fn succeeded(msg: impl Into<String>) -> Self {
        FormState::Succeeded(msg.into())
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        FormState::Failed(msg.into())
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, FormState::Succeeded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FormState::Failed(_))
    }

    /// Message for the banner, empty while idle.
    pub fn message(&self) -> &str {
        match self {
            FormState::Idle => "",
            FormState::Succeeded(msg) | FormState::Failed(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_renders_no_banner() {
        let state = FormState::default();
        assert!(!state.is_failed());
        assert!(!state.is_succeeded());
        assert_eq!(state.message(), "");
    }

    #[test]
    fn failure_and_success_are_mutually_exclusive() {
        let failed = FormState::failed("nope");
        assert!(failed.is_failed() && !failed.is_succeeded());

        let ok = FormState::succeeded("done");
        assert!(ok.is_succeeded() && !ok.is_failed());
    }
}

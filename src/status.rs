#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Info,
    Busy,
    Success,
    Error,
}

/// Single-line status channel: the most recent message wins.
#[derive(Debug)]
pub struct StatusLine {
    text: String,
    kind: Kind,
}

impl StatusLine {
    pub fn new() -> Self {
        StatusLine {
            text: "Ready".to_string(),
            kind: Kind::Info,
        }
    }

    pub fn set<T: Into<String>>(&mut self, kind: Kind, text: T) {
        self.text = text.into();
        self.kind = kind;
    }

    pub fn info<T: Into<String>>(&mut self, text: T) {
        self.set(Kind::Info, text);
    }

    pub fn busy<T: Into<String>>(&mut self, text: T) {
        self.set(Kind::Busy, text);
    }

    pub fn success<T: Into<String>>(&mut self, text: T) {
        self.set(Kind::Success, text);
    }

    pub fn error<T: Into<String>>(&mut self, text: T) {
        self.set(Kind::Error, text);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }
}

/// Secondary indicator tied to the prompt submission lifecycle, shown next
/// to the prompt heading and separate from the main status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptIndicator {
    #[default]
    Hidden,
    Processing,
    Done,
    Failed,
}

impl PromptIndicator {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            PromptIndicator::Hidden => None,
            PromptIndicator::Processing => Some("processing"),
            PromptIndicator::Done => Some("done"),
            PromptIndicator::Failed => Some("error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_recent_message_wins() {
        let mut status = StatusLine::new();
        status.busy("Loading history...");
        status.success("History loaded (3 items)");
        assert_eq!(status.text(), "History loaded (3 items)");
        assert_eq!(status.kind(), Kind::Success);
    }

    #[test]
    fn starts_ready() {
        let status = StatusLine::new();
        assert_eq!(status.text(), "Ready");
        assert_eq!(status.kind(), Kind::Info);
    }

    #[test]
    fn indicator_labels() {
        assert_eq!(PromptIndicator::Hidden.label(), None);
        assert_eq!(PromptIndicator::Processing.label(), Some("processing"));
    }
}

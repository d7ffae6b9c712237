use std::io::Write;

/// Display surface for the ticker line.
/// Fire-and-forget: implementations swallow their own I/O failures.
pub trait Presenter: Send {
    fn set_display_text(&mut self, text: &str);

    /// Presenter name for startup logs
    fn name(&self) -> &str;
}

/// Which presenter to build at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterKind {
    Stdout,
    TerminalTitle,
}

impl std::str::FromStr for PresenterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(PresenterKind::Stdout),
            "title" | "terminal-title" => Ok(PresenterKind::TerminalTitle),
            other => Err(format!("unknown presenter '{}'", other)),
        }
    }
}

impl PresenterKind {
    pub fn build(self) -> Box<dyn Presenter> {
        match self {
            PresenterKind::Stdout => Box::new(StdoutPresenter::new(std::io::stdout())),
            PresenterKind::TerminalTitle => Box::new(TerminalTitlePresenter::new(std::io::stdout())),
        }
    }
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn set_display_text(&mut self, text: &str) {
        (**self).set_display_text(text)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Prints each distinct title on its own line
pub struct StdoutPresenter<W> {
    out: W,
    last: Option<String>,
}

impl<W: Write + Send> StdoutPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }
}

impl<W: Write + Send> Presenter for StdoutPresenter<W> {
    fn set_display_text(&mut self, text: &str) {
        if self.last.as_deref() == Some(text) {
            return;
        }
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            tracing::warn!("Failed to write display text: {}", e);
        }
        self.last = Some(text.to_string());
    }

    fn name(&self) -> &str {
        "stdout"
    }
}

/// Sets the terminal window title with the OSC 0 escape sequence
pub struct TerminalTitlePresenter<W> {
    out: W,
    last: Option<String>,
}

impl<W: Write + Send> TerminalTitlePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }
}

impl<W: Write + Send> Presenter for TerminalTitlePresenter<W> {
    fn set_display_text(&mut self, text: &str) {
        if self.last.as_deref() == Some(text) {
            return;
        }
        // BEL/ESC inside the title would terminate the sequence early
        let clean: String = text.chars().filter(|c| !c.is_control()).collect();
        if let Err(e) = write!(self.out, "\x1b]0;{}\x07", clean).and_then(|_| self.out.flush()) {
            tracing::warn!("Failed to set terminal title: {}", e);
        }
        self.last = Some(text.to_string());
    }

    fn name(&self) -> &str {
        "terminal-title"
    }
}

//! Terminal front end: prints session events and draws a download progress bar.

use std::io::{self, IsTerminal, Write};

use indicatif::{ProgressBar, ProgressStyle};
use linefetch_core::{Observer, SessionEvent};

const BAR_TEMPLATE: &str = "{msg} [{bar:40}] {bytes}/{total_bytes} ({percent}%)";

/// Observer that writes events to stdout.
///
/// While a sized download is running on an interactive terminal, progress is
/// drawn as a bar instead of one line per chunk.
pub(crate) struct TerminalObserver {
    show_bar: bool,
    bar: Option<ProgressBar>,
    armed: Option<String>,
}

impl TerminalObserver {
    pub(crate) fn new(show_progress: bool) -> Self {
        Self {
            show_bar: show_progress && io::stdout().is_terminal(),
            bar: None,
            armed: None,
        }
    }

    fn start_bar(&mut self, total: u64) -> &ProgressBar {
        let filename = self.armed.clone().unwrap_or_default();
        self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template(BAR_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            bar.set_message(filename);
            bar
        })
    }

    fn finish_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn print(&self, event: &SessionEvent) {
        match &self.bar {
            Some(bar) => bar.println(event.to_string()),
            None => {
                let mut stdout = io::stdout().lock();
                let _ = writeln!(stdout, "{event}");
                let _ = stdout.flush();
            }
        }
    }
}

impl Observer for TerminalObserver {
    fn notify(&mut self, event: SessionEvent) {
        match &event {
            SessionEvent::Armed { filename } => {
                self.finish_bar();
                self.armed = Some(filename.clone());
                self.print(&event);
            }
            SessionEvent::Progress(progress)
                if self.show_bar && progress.declared_size > 0 =>
            {
                let bar = self.start_bar(progress.declared_size);
                bar.set_position(progress.bytes_written);
            }
            SessionEvent::Completed { .. } | SessionEvent::Aborted { .. } => {
                self.finish_bar();
                self.armed = None;
                self.print(&event);
            }
            SessionEvent::Disconnected => {
                self.finish_bar();
                self.print(&event);
            }
            _ => self.print(&event),
        }
    }
}

impl Drop for TerminalObserver {
    fn drop(&mut self) {
        self.finish_bar();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linefetch_core::Progress;

    #[test]
    fn test_plain_mode_never_creates_bar() {
        let mut observer = TerminalObserver::new(false);
        observer.notify(SessionEvent::Armed {
            filename: "a.pdf".to_string(),
        });
        observer.notify(SessionEvent::Progress(Progress {
            accepted: 4,
            bytes_written: 4,
            declared_size: 8,
        }));
        assert!(observer.bar.is_none());
        assert_eq!(observer.armed.as_deref(), Some("a.pdf"));
    }

    #[test]
    fn test_completion_clears_armed_target() {
        let mut observer = TerminalObserver::new(false);
        observer.notify(SessionEvent::Armed {
            filename: "a.pdf".to_string(),
        });
        observer.notify(SessionEvent::Completed {
            filename: "a.pdf".to_string(),
            bytes: 8,
        });
        assert!(observer.armed.is_none());
    }

    #[test]
    fn test_bar_finishes_on_abort() {
        let mut observer = TerminalObserver {
            show_bar: true,
            bar: None,
            armed: Some("b.zip".to_string()),
        };
        observer.notify(SessionEvent::Progress(Progress {
            accepted: 3,
            bytes_written: 3,
            declared_size: 10,
        }));
        assert_eq!(observer.bar.as_ref().map(ProgressBar::position), Some(3));

        observer.notify(SessionEvent::Aborted {
            filename: "b.zip".to_string(),
            reason: "connection closed".to_string(),
        });
        assert!(observer.bar.is_none());
    }
}

use super::state::{ExecutionResult, ExecutionSummary, TestStatus};
use tokio::sync::broadcast;

/// Execution events for real-time updates
#[derive(Debug, Clone)]
pub enum TestEvent {
    // Batch events
    BatchStarted {
        base_url: String,
        available: usize,
        selected: usize,
    },
    BatchFinished {
        summary: ExecutionSummary,
    },

    // Test events
    TestStarted {
        index: usize,
        total: usize,
        test_name: String,
        strategy: String,
    },
    TestFinished {
        index: usize,
        result: ExecutionResult,
    },
}

/// Event emitter for broadcasting execution events
pub struct EventEmitter {
    sender: broadcast::Sender<TestEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<TestEvent>) {
        let (sender, receiver) = broadcast::channel(100);
        (Self { sender }, receiver)
    }

    /// Publish an event. Without subscribers this is a no-op.
    pub fn emit(&self, event: TestEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TestEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }
}

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration as StdDuration;

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    /// Render events until every emitter is dropped
    pub async fn listen(mut receiver: broadcast::Receiver<TestEvent>) {
        use colored::Colorize;
        use std::io::IsTerminal;

        let interactive = std::io::stdout().is_terminal();
        let mut spinner: Option<(ProgressBar, String)> = None;

        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("Console output skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                TestEvent::BatchStarted {
                    base_url,
                    available,
                    selected,
                } => {
                    println!(
                        "\n{} Executing {} of {} test cases against {}",
                        "▶".green().bold(),
                        selected,
                        available,
                        base_url.cyan()
                    );
                }

                TestEvent::TestStarted {
                    index,
                    total,
                    test_name,
                    strategy,
                } => {
                    let body = format!(
                        "[{}/{}] {} {}",
                        index,
                        total,
                        test_name,
                        format!("({})", strategy).dimmed()
                    );
                    let pb = if interactive {
                        ProgressBar::new_spinner()
                    } else {
                        // Piped output gets no escape codes
                        ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
                    };
                    if let Ok(style) = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("  {spinner} {msg}")
                    {
                        pb.set_style(style);
                    }
                    pb.set_message(format!("{}... ", body));
                    pb.enable_steady_tick(StdDuration::from_millis(100));
                    spinner = Some((pb, body));
                }

                TestEvent::TestFinished { index, result } => {
                    let body = match spinner.take() {
                        Some((pb, body)) => {
                            pb.finish_and_clear();
                            body
                        }
                        None => format!("[{}] {}", index, result.test_name),
                    };
                    let glyph = match result.status {
                        TestStatus::Passed => "✓".green(),
                        TestStatus::Failed => "✗".red(),
                    };
                    println!("  {} {} ({})", glyph, body, result.execution_time);
                    println!("      {}", result.details.dimmed());
                }

                TestEvent::BatchFinished { summary } => {
                    if let Some((pb, _)) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!("\n{} Execution finished", "■".blue().bold());
                    println!("  Total tests: {}", summary.total_tests);
                    println!(
                        "  {} passed, {} failed",
                        summary.passed.to_string().green(),
                        summary.failed.to_string().red()
                    );
                    println!("  Duration: {}", summary.execution_time);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(index: usize, test_name: &str) -> TestEvent {
        TestEvent::TestStarted {
            index,
            total: 2,
            test_name: test_name.into(),
            strategy: "functional:generic".into(),
        }
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_noop() {
        let emitter = EventEmitter::default();
        emitter.emit(started(1, "nobody listening"));
    }

    #[tokio::test]
    async fn test_subscribers_receive_events_in_order() {
        let (emitter, mut receiver) = EventEmitter::new();
        emitter.emit(started(1, "first"));
        emitter.emit(started(2, "second"));

        for (expected_index, expected) in [(1, "first"), (2, "second")] {
            match receiver.recv().await.unwrap() {
                TestEvent::TestStarted {
                    index, test_name, ..
                } => {
                    assert_eq!(index, expected_index);
                    assert_eq!(test_name, expected);
                }
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_listener_stops_when_emitter_dropped() {
        let (emitter, receiver) = EventEmitter::new();
        let listener = tokio::spawn(ConsoleEventListener::listen(receiver));
        emitter.emit(TestEvent::BatchStarted {
            base_url: "http://app.test".into(),
            available: 0,
            selected: 0,
        });
        drop(emitter);
        listener.await.unwrap();
    }
}

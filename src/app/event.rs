//! Terminal event abstraction.
//!
//! Wraps crossterm events into a simpler enum and runs a background reader
//! that forwards them over a channel so the main loop stays non-blocking.
//! The reader is this app's gesture source: it must be disposed when the
//! UI goes away, which [`EventSource`] does on drop.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// High-level events consumed by the application.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
}

/// Owns the reader task.  Dropping it (or calling [`EventSource::dispose`])
/// stops the reader within one tick and closes the channel.
pub struct EventSource {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    stop: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl EventSource {
    /// Start polling the terminal.  A `Tick` is sent whenever `tick_rate`
    /// passes without input.
    pub fn spawn(tick_rate: Duration) -> Self {
        Self::spawn_with(tick_rate, |timeout| {
            if event::poll(timeout)? {
                event::read().map(Some)
            } else {
                Ok(None)
            }
        })
    }

    /// Run the reader over `next`, which waits up to the tick rate and
    /// yields the next terminal event, or `None` on timeout.
    fn spawn_with<F>(tick_rate: Duration, mut next: F) -> Self
    where
        F: FnMut(Duration) -> io::Result<Option<CtEvent>> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        // crossterm's poll blocks, so keep it off the async workers.
        let task = tokio::task::spawn_blocking(move || {
            while !flag.load(Ordering::Relaxed) {
                let app_event = match next(tick_rate) {
                    Ok(Some(CtEvent::Key(k))) => AppEvent::Key(k),
                    Ok(Some(CtEvent::Mouse(m))) => AppEvent::Mouse(m),
                    Ok(Some(CtEvent::Resize(w, h))) => AppEvent::Resize(w, h),
                    Ok(Some(_)) => continue,
                    Ok(None) => AppEvent::Tick,
                    Err(e) => {
                        tracing::warn!("terminal poll failed: {e}");
                        std::thread::sleep(tick_rate);
                        continue;
                    }
                };
                if tx.send(app_event).is_err() {
                    break; // receiver dropped
                }
            }
            tracing::debug!("event reader stopped");
        });

        Self {
            rx,
            stop,
            task: Some(task),
        }
    }

    pub async fn recv(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    /// Stop the reader and release the channel, dropping anything still
    /// queued.  Idempotent.
    pub fn dispose(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
        if self.task.take().is_some() {
            tracing::debug!("event source disposed");
        }
    }
}

impl Drop for EventSource {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    const TICK: Duration = Duration::from_millis(5);

    /// A terminal that never produces input; counts how often it is polled.
    fn idle_terminal(polls: &Arc<AtomicUsize>) -> impl FnMut(Duration) -> io::Result<Option<CtEvent>> {
        let polls = Arc::clone(polls);
        move |timeout| {
            polls.fetch_add(1, Ordering::Relaxed);
            std::thread::sleep(timeout);
            Ok(None)
        }
    }

    async fn reader_exits(polls: &Arc<AtomicUsize>) -> bool {
        tokio::time::timeout(Duration::from_secs(2), async {
            while Arc::strong_count(polls) > 1 {
                tokio::time::sleep(TICK).await;
            }
        })
        .await
        .is_ok()
    }

    #[tokio::test]
    async fn idle_terminal_ticks() {
        let polls = Arc::new(AtomicUsize::new(0));
        let mut source = EventSource::spawn_with(TICK, idle_terminal(&polls));
        assert!(matches!(source.recv().await, Some(AppEvent::Tick)));
        assert!(polls.load(Ordering::Relaxed) >= 1);
    }

    #[tokio::test]
    async fn dispose_is_idempotent_and_closes_the_channel() {
        let polls = Arc::new(AtomicUsize::new(0));
        let mut source = EventSource::spawn_with(TICK, idle_terminal(&polls));
        assert!(source.recv().await.is_some());

        source.dispose();
        source.dispose();
        assert!(source.recv().await.is_none());
        assert!(reader_exits(&polls).await);
    }

    #[tokio::test]
    async fn dropping_the_source_stops_the_reader() {
        let polls = Arc::new(AtomicUsize::new(0));
        let source = EventSource::spawn_with(TICK, idle_terminal(&polls));
        drop(source);
        assert!(reader_exits(&polls).await);
    }

    #[tokio::test]
    async fn poll_errors_do_not_end_the_reader() {
        let mut failures = 0;
        let mut source = EventSource::spawn_with(TICK, move |timeout| {
            if failures < 2 {
                failures += 1;
                return Err(io::Error::other("no tty"));
            }
            std::thread::sleep(timeout);
            Ok(None)
        });
        assert!(matches!(source.recv().await, Some(AppEvent::Tick)));
    }
}

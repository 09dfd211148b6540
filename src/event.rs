use std::io;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::cluster::telemetry::RawWorkers;
use crate::error::SourceError;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    Resize,
    /// Outcome of a fetch that ran on its own task.
    Fetched(Result<RawWorkers, SourceError>),
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    /// Weak so the channel closes once the input task is gone.
    tx: mpsc::WeakUnboundedSender<Event>,
    _task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self::with_input(event::EventStream::new, tick_rate)
    }

    /// Runs the loop over an arbitrary terminal event stream. The stream is
    /// built on the input task so a reader that fails to start only ends that task.
    pub fn with_input<F, St>(make_input: F, tick_rate: Duration) -> Self
    where
        F: FnOnce() -> St + Send + 'static,
        St: Stream<Item = io::Result<CrosstermEvent>> + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();
        let weak = tx.downgrade();

        let task = tokio::spawn(async move {
            let event_tx = tx;
            let mut reader = make_input();
            let mut tick_interval = tokio::time::interval(tick_rate);
            tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    maybe_event = reader.next() => {
                        match maybe_event {
                            Some(Ok(evt)) => {
                                let mapped = match evt {
                                    CrosstermEvent::Key(key) => Some(Event::Key(key)),
                                    CrosstermEvent::Resize(_, _) => Some(Event::Resize),
                                    _ => None,
                                };
                                if let Some(e) = mapped
                                    && event_tx.send(e).is_err()
                                {
                                    break;
                                }
                            }
                            Some(Err(err)) => {
                                tracing::warn!(error = %err, "terminal input failed");
                                break;
                            }
                            None => break,
                        }
                    }
                    _ = tick_interval.tick() => {
                        if event_tx.send(Event::Tick).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            rx,
            tx: weak,
            _task: task,
        }
    }

    /// Handle for tasks that report back into the loop, such as fetches.
    /// Upgrading fails once the loop has shut down.
    pub fn sender(&self) -> mpsc::WeakUnboundedSender<Event> {
        self.tx.clone()
    }

    /// `None` once the input task has ended for any reason.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use futures::stream;
    use tokio::time::timeout;

    const SLOW_TICK: Duration = Duration::from_secs(3600);

    async fn drain(handler: &mut EventHandler) -> Vec<Event> {
        let mut seen = Vec::new();
        let closed = timeout(Duration::from_secs(2), async {
            while let Some(event) = handler.next().await {
                seen.push(event);
            }
        })
        .await;
        assert!(closed.is_ok(), "event channel stayed open after input ended");
        seen
    }

    #[tokio::test]
    async fn channel_closes_when_input_ends() {
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        let mut handler = EventHandler::with_input(
            move || stream::iter(vec![Ok(CrosstermEvent::Key(key))]),
            SLOW_TICK,
        );
        let seen = drain(&mut handler).await;
        assert!(
            seen.iter()
                .any(|e| matches!(e, Event::Key(k) if k.code == KeyCode::Char('q')))
        );
    }

    #[tokio::test]
    async fn channel_closes_when_input_errors() {
        let mut handler = EventHandler::with_input(
            || stream::iter(vec![Err(io::Error::other("no terminal"))]),
            Duration::from_millis(10),
        );
        drain(&mut handler).await;
        assert!(handler.sender().upgrade().is_none());
    }

    #[tokio::test]
    async fn channel_closes_when_input_task_panics() {
        let mut handler = EventHandler::with_input(
            || {
                stream::poll_fn(|_| -> std::task::Poll<Option<io::Result<CrosstermEvent>>> {
                    panic!("reader blew up")
                })
            },
            Duration::from_millis(10),
        );
        drain(&mut handler).await;
    }

    #[tokio::test]
    async fn fetch_results_flow_through_the_weak_sender() {
        let mut handler = EventHandler::with_input(
            || stream::pending::<io::Result<CrosstermEvent>>(),
            SLOW_TICK,
        );
        let tx = handler.sender().upgrade().expect("loop is running");
        tx.send(Event::Fetched(Ok(RawWorkers::new()))).unwrap();
        drop(tx);

        loop {
            match handler.next().await {
                Some(Event::Fetched(Ok(raw))) => {
                    assert!(raw.is_empty());
                    break;
                }
                Some(_) => continue,
                None => panic!("channel closed while input was still open"),
            }
        }
    }
}

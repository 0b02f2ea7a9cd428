use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::api::operations::SearchOperations;
use crate::api::schema::search::Suggestion;

use super::SearchFilters;

enum Signal<T> {
    Value(T),
    Reset,
}

/// Trailing-edge debouncer: the callback receives the latest value once
/// no new value has arrived for `wait`. Dropping the debouncer discards
/// whatever is pending.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Signal<T>>,
    cancel: CancellationToken,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(wait: Duration, mut callback: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let stop = cancel.clone();

        tokio::spawn(async move {
            loop {
                let mut pending = tokio::select! {
                    _ = stop.cancelled() => return,
                    signal = rx.recv() => match signal {
                        Some(Signal::Value(value)) => value,
                        Some(Signal::Reset) => continue,
                        None => return,
                    },
                };
                loop {
                    tokio::select! {
                        biased;
                        _ = stop.cancelled() => return,
                        signal = rx.recv() => match signal {
                            Some(Signal::Value(value)) => pending = value,
                            Some(Signal::Reset) => break,
                            None => return,
                        },
                        _ = sleep(wait) => {
                            callback(pending).await;
                            break;
                        }
                    }
                }
            }
        });

        Debouncer { tx, cancel }
    }

    /// Replaces the pending value and restarts the wait.
    pub fn call(&self, value: T) {
        let _ = self.tx.send(Signal::Value(value));
    }

    /// Discards the pending value, if any.
    pub fn reset(&self) {
        let _ = self.tx.send(Signal::Reset);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Debounced type-ahead: each input is published to subscribers as a
/// suggestion list once typing settles.
pub struct SuggestionFeed {
    debouncer: Debouncer<SearchFilters>,
    suggestions: watch::Receiver<Vec<Suggestion>>,
}

impl SuggestionFeed {
    pub fn new(client: ApiClient, token: String, wait: Duration) -> Self {
        let (tx, suggestions) = watch::channel(Vec::new());
        let debouncer = Debouncer::new(wait, move |filters: SearchFilters| {
            let client = client.clone();
            let token = token.clone();
            let tx = tx.clone();
            async move {
                let found = SearchOperations::suggest(&client, &token, &filters).await;
                tx.send_replace(found);
            }
        });
        SuggestionFeed {
            debouncer,
            suggestions,
        }
    }

    pub fn input(&self, filters: SearchFilters) {
        self.debouncer.call(filters);
    }

    pub fn clear(&self) {
        self.debouncer.reset();
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Suggestion>> {
        self.suggestions.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Debouncer<String>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer = Debouncer::new(Duration::from_millis(300), move |value: String| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(value);
            }
        });
        (seen, debouncer)
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_settled_value_fires() {
        let (seen, debouncer) = recorder();
        debouncer.call("a".into());
        sleep(Duration::from_millis(100)).await;
        debouncer.call("ab".into());
        sleep(Duration::from_millis(250)).await;
        debouncer.call("abc".into());
        sleep(Duration::from_millis(200)).await;
        assert!(seen.lock().unwrap().is_empty());

        sleep(Duration::from_millis(200)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["abc".to_string()]);

        debouncer.call("x".into());
        sleep(Duration::from_millis(400)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["abc".to_string(), "x".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_and_drop_discard_pending() {
        let (seen, debouncer) = recorder();
        debouncer.call("lost".into());
        debouncer.reset();
        sleep(Duration::from_millis(400)).await;
        assert!(seen.lock().unwrap().is_empty());

        debouncer.call("also lost".into());
        drop(debouncer);
        sleep(Duration::from_millis(400)).await;
        assert!(seen.lock().unwrap().is_empty());
    }
}

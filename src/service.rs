//! Restartable background operations.
//!
//! A [`Service`] runs at most one instance of an operation at a time.
//! Restarting aborts the previous run, and each run is tagged with a
//! generation so that a late result from a superseded run can be told apart
//! from the result of the latest request.
//!
//! Blocking work cannot be aborted once started. Runs of one service take a
//! shared gate before they start, so a restarted run only begins after the
//! superseded one has returned.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// Result of one run, delivered on the owner's completion queue.
#[derive(Debug)]
pub struct Completion<T> {
    pub service: &'static str,
    pub generation: u64,
    pub result: Result<T>,
}

/// One-shot background operation of a single kind.
pub struct Service<T> {
    name: &'static str,
    generation: u64,
    /// The latest request has not been accepted yet
    pending: bool,
    gate: Arc<Mutex<()>>,
    handle: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Completion<T>>,
}

impl<T: Send + 'static> Service<T> {
    /// Create a service and the receiving end of its completion queue.
    pub fn new(name: &'static str) -> (Self, mpsc::UnboundedReceiver<Completion<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                name,
                generation: 0,
                pending: false,
                gate: Arc::new(Mutex::new(())),
                handle: None,
                tx,
            },
            rx,
        )
    }

    /// Supersede any in-flight run with `task`. Must be called from within
    /// a tokio runtime.
    pub fn restart<F>(&mut self, task: F) -> u64
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        self.pending = true;

        let generation = self.generation;
        let name = self.name;
        let tx = self.tx.clone();

        log::debug!("{} service: starting run {}", name, generation);
        self.handle = Some(tokio::spawn(async move {
            let result = task.await;
            let _ = tx.send(Completion {
                service: name,
                generation,
                result,
            });
        }));

        generation
    }

    /// Like [`Service::restart`] for blocking work such as file I/O.
    ///
    /// The new work starts only once blocking work of earlier runs has
    /// returned; runs of one service never overlap.
    pub fn restart_blocking<F>(&mut self, work: F) -> u64
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let name = self.name;
        let gate = self.gate.clone();
        self.restart(async move {
            let permit = gate.lock_owned().await;
            // the permit lives on the blocking thread, so aborting this
            // task does not release it early
            let work = move || {
                let _permit = permit;
                work()
            };
            match tokio::task::spawn_blocking(work).await {
                Ok(result) => result,
                Err(e) => {
                    log::error!("{} service: worker failed: {}", name, e);
                    Err(Error::Cancelled)
                }
            }
        })
    }

    /// Abort the in-flight run, if any. Its result will never be delivered.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                log::debug!("{} service: cancelling run {}", self.name, self.generation);
            }
            handle.abort();
        }
        self.pending = false;
    }

    /// Whether the latest request is still waiting to be accepted.
    pub fn is_running(&self) -> bool {
        self.pending
    }

    /// Whether `completion` answers the latest request.
    pub fn is_current(&self, completion: &Completion<T>) -> bool {
        completion.generation == self.generation
    }

    /// Take delivery of `completion`. Returns `false` for results of
    /// superseded or cancelled runs, which callers must discard.
    pub fn accept(&mut self, completion: &Completion<T>) -> bool {
        if self.pending && self.is_current(completion) {
            self.pending = false;
            true
        } else {
            false
        }
    }
}

impl<T> Drop for Service<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_completion_is_delivered() {
        let (mut service, mut rx) = Service::new("test");
        let generation = service.restart(async { Ok(7) });

        let completion = rx.recv().await.unwrap();
        assert_eq!(completion.generation, generation);
        assert_eq!(completion.service, "test");
        assert!(service.is_running());
        assert!(service.accept(&completion));
        assert!(!service.is_running());
        assert!(!service.accept(&completion));
        assert_eq!(completion.result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_restart_supersedes_previous_run() {
        let (mut service, mut rx) = Service::new("test");

        service.restart(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("old")
        });
        assert!(service.is_running());
        let latest = service.restart(async { Ok("new") });

        let completion = rx.recv().await.unwrap();
        assert_eq!(completion.generation, latest);
        assert_eq!(completion.result.unwrap(), "new");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stale_completion_is_detected() {
        let (mut service, mut rx) = Service::new("test");

        // blocking work is not aborted, so its result still lands
        service.restart_blocking(|| {
            std::thread::sleep(Duration::from_millis(50));
            Ok(1)
        });
        let first = rx.recv().await.unwrap();
        service.restart(async { Ok(2) });

        assert!(!service.accept(&first));
        let second = rx.recv().await.unwrap();
        assert!(service.accept(&second));
    }

    #[tokio::test]
    async fn test_errors_are_delivered() {
        let (mut service, mut rx) = Service::<()>::new("test");
        service.restart_blocking(|| Err(Error::NoDocument));

        let completion = rx.recv().await.unwrap();
        assert!(service.accept(&completion));
        assert!(matches!(completion.result, Err(Error::NoDocument)));
    }

    #[tokio::test]
    async fn test_blocking_runs_never_overlap() {
        let (mut service, mut rx) = Service::new("test");
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));

        let first = log.clone();
        service.restart_blocking(move || {
            first.lock().unwrap().push("first start");
            std::thread::sleep(Duration::from_millis(150));
            first.lock().unwrap().push("first end");
            Ok(1)
        });
        tokio::time::sleep(Duration::from_millis(30)).await;

        let second = log.clone();
        service.restart_blocking(move || {
            second.lock().unwrap().push("second start");
            Ok(2)
        });

        let completion = rx.recv().await.unwrap();
        assert!(service.accept(&completion));
        assert_eq!(completion.result.unwrap(), 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first start", "first end", "second start"]
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_clears_pending() {
        let (mut service, mut rx) = Service::new("test");
        service.restart(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        });

        service.cancel();
        assert!(!service.is_running());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err());
    }
}

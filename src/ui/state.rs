use ratatui::style::Color;
use std::fmt::Display;
use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Render state of one remote read
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Fetch<T> {
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Fetch::Loaded(value),
            Err(e) => Fetch::Failed(e.to_string()),
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Fetch::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Fetch::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Fetch::Loading)
    }

    /// Status bar text for this read
    pub fn status_text(&self, what: &str) -> String {
        match self {
            Fetch::Idle => "Ready".to_string(),
            Fetch::Loading => format!("Loading {}...", what),
            Fetch::Loaded(_) => format!("Loaded {}", what),
            Fetch::Failed(message) => format!("Error loading {}: {}", what, message),
        }
    }
}

impl<T> Default for Fetch<T> {
    fn default() -> Self {
        Fetch::Idle
    }
}

/// Outcome message of a write, rendered inside the view
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(m) | Notice::Success(m) | Notice::Error(m) => m,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Notice::Info(_) => Color::Cyan,
            Notice::Success(_) => Color::Green,
            Notice::Error(_) => Color::Red,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Requests issued by one view, bound to its mounted lifetime.
///
/// Every spawned request sends exactly one message back, tagged with the
/// generation it was started in. `cancel` aborts the running tasks and bumps
/// the generation, so anything that still arrives from before is dropped.
#[derive(Debug)]
pub struct RequestScope<M> {
    generation: u64,
    in_flight: usize,
    handles: Vec<JoinHandle<()>>,
    sender: mpsc::UnboundedSender<(u64, M)>,
    receiver: mpsc::UnboundedReceiver<(u64, M)>,
}

impl<M: Send + 'static> RequestScope<M> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            generation: 0,
            in_flight: 0,
            handles: Vec::new(),
            sender,
            receiver,
        }
    }

    /// Run a request on the runtime; its result comes back through `try_next`/`next`
    pub fn spawn<F>(&mut self, request: F)
    where
        F: Future<Output = M> + Send + 'static,
    {
        let generation = self.generation;
        let sender = self.sender.clone();

        self.handles.retain(|handle| !handle.is_finished());
        self.handles.push(tokio::spawn(async move {
            let message = request.await;
            let _ = sender.send((generation, message));
        }));
        self.in_flight += 1;
    }

    /// Abort everything in flight; late results are discarded
    pub fn cancel(&mut self) {
        if self.in_flight > 0 {
            debug!("Cancelling {} in-flight request(s)", self.in_flight);
        }
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        self.generation += 1;
        self.in_flight = 0;
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Next result of the current generation, without waiting
    pub fn try_next(&mut self) -> Option<M> {
        while let Ok((generation, message)) = self.receiver.try_recv() {
            if let Some(message) = self.accept(generation, message) {
                return Some(message);
            }
        }
        None
    }

    /// Wait for the next result of the current generation; `None` when nothing is in flight
    pub async fn next(&mut self) -> Option<M> {
        while self.in_flight > 0 {
            let (generation, message) = self.receiver.recv().await?;
            if let Some(message) = self.accept(generation, message) {
                return Some(message);
            }
        }
        None
    }

    fn accept(&mut self, generation: u64, message: M) -> Option<M> {
        if generation != self.generation {
            debug!("Dropping result from cancelled generation {}", generation);
            return None;
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(message)
    }
}

impl<M: Send + 'static> Default for RequestScope<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Drop for RequestScope<M> {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

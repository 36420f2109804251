use crate::models::GeneratedImage;
use tokio::sync::watch;

/// Where the most recent request stands.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Loading,
    Succeeded(T),
    Failed(String),
}

impl<T> RequestState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, RequestState::Succeeded(_) | RequestState::Failed(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        RequestState::Idle
    }
}

/// Everything an observer of a tracker can see at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSnapshot<T> {
    pub state: RequestState<T>,
    pub response_data: Option<T>,
    pub generated_images: Vec<GeneratedImage>,
    /// Calls started and not yet settled or abandoned.
    pub in_flight: usize,
}

impl<T> TrackerSnapshot<T> {
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    pub fn response_data(&self) -> Option<&T> {
        self.response_data.as_ref()
    }

    pub fn generated_images(&self) -> &[GeneratedImage] {
        &self.generated_images
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl<T> Default for TrackerSnapshot<T> {
    fn default() -> Self {
        Self {
            state: RequestState::Idle,
            response_data: None,
            generated_images: Vec::new(),
            in_flight: 0,
        }
    }
}

/// Observable home of a tracker's state. Every write notifies subscribers
/// once, with the whole transition already applied.
pub struct StateCell<T> {
    tx: watch::Sender<TrackerSnapshot<T>>,
}

impl<T: Clone> StateCell<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(TrackerSnapshot::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> TrackerSnapshot<T> {
        self.tx.borrow().clone()
    }

    pub fn read<U>(&self, f: impl FnOnce(&TrackerSnapshot<T>) -> U) -> U {
        f(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot<T>> {
        self.tx.subscribe()
    }

    /// Enters `Loading`, dropping any previous error. The returned guard
    /// must be settled; if it is dropped first and no other call is still
    /// running, loading is cleared anyway.
    pub fn begin(&self) -> SettleGuard<'_, T> {
        self.tx.send_modify(|s| {
            s.in_flight += 1;
            s.state = RequestState::Loading;
        });
        SettleGuard {
            cell: self,
            settled: false,
        }
    }
}

impl<T: Clone> Default for StateCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One in-flight request's claim on the state cell.
pub struct SettleGuard<'a, T: Clone> {
    cell: &'a StateCell<T>,
    settled: bool,
}

impl<T: Clone> SettleGuard<'_, T> {
    pub fn succeed(mut self, data: T, image: GeneratedImage) {
        self.settled = true;
        self.cell.tx.send_modify(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            s.generated_images.push(image);
            s.response_data = Some(data.clone());
            s.state = RequestState::Succeeded(data);
        });
    }

    /// `response_data` is left as it was.
    pub fn fail(mut self, message: String) {
        self.settled = true;
        self.cell.tx.send_modify(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            s.state = RequestState::Failed(message);
        });
    }
}

impl<T: Clone> Drop for SettleGuard<'_, T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        // abandoned mid-flight: no outcome to record; loading ends only if
        // nothing else is still running
        self.cell.tx.send_modify(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            if s.in_flight == 0 && s.state.is_loading() {
                s.state = RequestState::Idle;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(prompt: &str) -> GeneratedImage {
        GeneratedImage::new(Some(format!("http://x/{}.png", prompt)), prompt)
    }

    #[test]
    fn starts_idle_and_empty() {
        let cell: StateCell<u32> = StateCell::new();
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.state, RequestState::Idle);
        assert!(!snapshot.is_loading());
        assert!(snapshot.error().is_none());
        assert!(snapshot.response_data().is_none());
        assert!(snapshot.generated_images().is_empty());
    }

    #[test]
    fn success_records_data_and_image_together() {
        let cell = StateCell::new();
        let mut rx = cell.subscribe();

        let guard = cell.begin();
        assert!(cell.read(|s| s.is_loading()));

        guard.succeed(7u32, image("cat"));
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.state, RequestState::Succeeded(7));
        assert_eq!(snapshot.response_data(), Some(&7));
        assert_eq!(snapshot.generated_images(), &[image("cat")]);
    }

    #[test]
    fn failure_keeps_previous_response() {
        let cell = StateCell::new();
        cell.begin().succeed(1u32, image("cat"));
        cell.begin().fail("boom".to_string());

        let snapshot = cell.snapshot();
        assert_eq!(snapshot.error(), Some("boom"));
        assert_eq!(snapshot.response_data(), Some(&1));
        assert_eq!(snapshot.generated_images().len(), 1);
    }

    #[test]
    fn begin_clears_previous_error() {
        let cell: StateCell<u32> = StateCell::new();
        cell.begin().fail("boom".to_string());

        let _guard = cell.begin();
        assert!(cell.read(|s| s.error().is_none()));
        assert!(cell.read(|s| s.is_loading()));
    }

    #[test]
    fn dropped_guard_stops_loading() {
        let cell: StateCell<u32> = StateCell::new();
        drop(cell.begin());
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.state, RequestState::Idle);
        assert!(snapshot.generated_images().is_empty());
    }

    #[test]
    fn dropped_guard_keeps_loading_while_another_call_runs() {
        let cell: StateCell<u32> = StateCell::new();
        let running = cell.begin();
        let abandoned = cell.begin();
        assert_eq!(cell.snapshot().in_flight(), 2);

        drop(abandoned);
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.state, RequestState::Loading);
        assert_eq!(snapshot.in_flight(), 1);

        running.succeed(3, image("cat"));
        let snapshot = cell.snapshot();
        assert_eq!(snapshot.state, RequestState::Succeeded(3));
        assert_eq!(snapshot.in_flight(), 0);
    }

    #[test]
    fn dropped_guard_leaves_settled_state_alone() {
        let cell: StateCell<u32> = StateCell::new();
        let stale = cell.begin();
        cell.begin().fail("boom".to_string());
        drop(stale);
        assert_eq!(cell.snapshot().error(), Some("boom"));
        assert_eq!(cell.snapshot().in_flight(), 0);
    }
}

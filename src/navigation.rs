//! Navigation requests flowing from views up to the router.
//!
//! Views never hold the router. They get a [`Navigator`] (the sending half of
//! an unbounded channel) through their context and post fragments to it; the
//! application shell drains the receiving half between fetches.

use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationRequest {
    /// Go to a route fragment such as `issue/42`.
    Navigate(String),
    /// Return to the previous fragment.
    Back,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    tx: mpsc::UnboundedSender<NavigationRequest>,
}

impl Navigator {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NavigationRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn navigate(&self, fragment: impl Into<String>) {
        self.send(NavigationRequest::Navigate(fragment.into()));
    }

    pub fn back(&self) {
        self.send(NavigationRequest::Back);
    }

    fn send(&self, request: NavigationRequest) {
        if self.tx.send(request).is_err() {
            tracing::debug!("Navigation request dropped; router is gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_arrive_in_order() {
        let (navigator, mut rx) = Navigator::channel();
        navigator.navigate("issue/1");
        navigator.clone().back();

        assert_eq!(
            rx.try_recv().unwrap(),
            NavigationRequest::Navigate("issue/1".to_string())
        );
        assert_eq!(rx.try_recv().unwrap(), NavigationRequest::Back);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped_is_silent() {
        let (navigator, rx) = Navigator::channel();
        drop(rx);
        navigator.navigate("issues/2");
    }
}

//! Per-run mutable state shared between the interpreter and the dispatcher.

use crate::snapshot::PageSnapshot;

/// State that lives for one agent run.
///
/// The session is passed by `&mut` through every turn, so only one tool can
/// touch the snapshot at a time.
#[derive(Debug, Default)]
pub struct Session {
    snapshot: Option<PageSnapshot>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent successful page analysis, if any.
    pub fn snapshot(&self) -> Option<&PageSnapshot> {
        self.snapshot.as_ref()
    }

    /// Replace the cached snapshot. Only a successful analysis calls this.
    pub fn store_snapshot(&mut self, snapshot: PageSnapshot) {
        self.snapshot = Some(snapshot);
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_no_snapshot() {
        assert!(!Session::new().has_snapshot());
    }

    #[test]
    fn store_overwrites_previous_snapshot() {
        let mut session = Session::new();
        session.store_snapshot(PageSnapshot {
            url: "https://a.example".into(),
            ..Default::default()
        });
        session.store_snapshot(PageSnapshot {
            url: "https://b.example".into(),
            ..Default::default()
        });
        assert_eq!(session.snapshot().unwrap().url, "https://b.example");
    }
}

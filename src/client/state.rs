//! Fetch state machine
//!
//! `Idle -> Loading -> Success | Failure`, with `Loading` re-entered on every
//! refetch. Only the attempt holding the current sequence number may leave
//! `Loading`.

use serde::Serialize;

/// Phase of a fetch unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPhase {
    Idle,
    Loading,
    Success,
    Failure,
}

/// What a subscriber sees: `{data, loading, error}` plus the producing entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchState<T> {
    pub entity: String,
    pub phase: FetchPhase,
    pub data: Option<Vec<T>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> FetchState<T> {
    pub fn idle(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            phase: FetchPhase::Idle,
            data: None,
            loading: false,
            error: None,
        }
    }

    /// Enter `Loading`, keeping the previous data visible
    pub(crate) fn start(&mut self) {
        self.phase = FetchPhase::Loading;
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self, data: Vec<T>) {
        self.phase = FetchPhase::Success;
        self.data = Some(data);
        self.loading = false;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.phase = FetchPhase::Failure;
        self.data = None;
        self.loading = false;
        self.error = Some(message.into());
    }

    /// True once an attempt has committed and none is running
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, FetchPhase::Success | FetchPhase::Failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let mut state = FetchState::<i32>::idle("grants");
        assert!(!state.loading);
        assert!(!state.is_settled());

        state.start();
        assert_eq!(state.phase, FetchPhase::Loading);
        assert!(state.loading);

        state.succeed(vec![1, 2]);
        assert_eq!(state.data, Some(vec![1, 2]));
        assert!(state.is_settled());

        state.start();
        assert_eq!(state.data, Some(vec![1, 2]));

        state.fail("Loading grants failed");
        assert_eq!(state.data, None);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Loading grants failed"));
    }
}

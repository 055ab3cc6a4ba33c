use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use shared::domain::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AddSponsor,
    DeleteSponsor,
}

/// Mutations currently running, keyed by user and action, so a second
/// identical request from the same admin is turned away instead of doubled.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    running: Arc<Mutex<HashSet<(UserId, Action)>>>,
}

/// Held for the duration of one mutation; releases its slot on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    running: Arc<Mutex<HashSet<(UserId, Action)>>>,
    key: (UserId, Action),
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when the same user already has this action running.
    pub fn try_begin(&self, user: &UserId, action: Action) -> Option<InFlightGuard> {
        let key = (user.clone(), action);
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if !running.insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            running: Arc::clone(&self.running),
            key,
        })
    }

    pub fn is_running(&self, user: &UserId, action: Action) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(user.clone(), action))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

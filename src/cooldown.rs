use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::time::Instant;

use crate::interaction::UserId;

/// Per-user cooldown state for a single command.
///
/// An entry is created the first time a user is allowed through and
/// removed by a background timer once its window has elapsed; while the
/// entry is live the user is denied. Purely in-memory: a restart clears
/// all cooldowns, which is acceptable at second-to-minute window
/// scales.
pub struct CooldownTracker {
    window: Duration,
    expiries: Arc<Mutex<HashMap<UserId, Instant>>>,
}

impl CooldownTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            expiries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Checks and arms in one step. Returns the remaining time if the
    /// user is still cooling (deny), otherwise records
    /// `now + window` as the user's expiry and returns `None` (allow).
    /// A user is allowed again exactly at their expiry instant.
    pub fn try_acquire(&self, user: UserId) -> Option<Duration> {
        if self.window.is_zero() {
            return None;
        }

        let now = Instant::now();
        let mut expiries = self.expiries.lock().unwrap();
        if let Some(expiry) = expiries.get(&user)
            && now < *expiry
        {
            return Some(*expiry - now);
        }

        let expiry = now + self.window;
        expiries.insert(user, expiry);
        drop(expiries);

        // Entries clean themselves up once the window elapses. The
        // removal re-checks the stored expiry: a timer that fires after
        // the user was re-armed must not drop the live entry.
        let expiries = Arc::clone(&self.expiries);
        tokio::spawn(async move {
            tokio::time::sleep_until(expiry).await;
            let mut expiries = expiries.lock().unwrap();
            if expiries.get(&user).is_some_and(|e| *e <= Instant::now()) {
                expiries.remove(&user);
            }
        });

        None
    }

    #[cfg(test)]
    fn tracked(&self, user: UserId) -> bool {
        self.expiries.lock().unwrap().contains_key(&user)
    }
}

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{SystemTime, UNIX_EPOCH};
use lazy_static::lazy_static;
use serenity::model::id::UserId;
use tokio::sync::Mutex;

pub const COOLDOWN_SECONDS: u64 = 5;

// Entries older than the window are pruned once the table grows past this
const PRUNE_THRESHOLD: usize = 1024;

lazy_static! {
    static ref COMMAND_COOLDOWNS: Mutex<CooldownTable<UserId>> =
        Mutex::new(CooldownTable::new(COOLDOWN_SECONDS));
}

/// Last-use timestamps (unix seconds) per key
pub struct CooldownTable<K> {
    last_used: HashMap<K, u64>,
    window: u64,
}

impl<K: Eq + Hash> CooldownTable<K> {
    pub fn new(window: u64) -> Self {
        Self {
            last_used: HashMap::new(),
            window,
        }
    }

    /// Record a use at `now`, or return the seconds left on the cooldown
    pub fn check(&mut self, key: K, now: u64) -> Result<(), u64> {
        if let Some(&last_time) = self.last_used.get(&key) {
            let elapsed = now.saturating_sub(last_time);
            if elapsed < self.window {
                return Err(self.window - elapsed);
            }
        }

        if self.last_used.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            self.last_used.retain(|_, &mut t| now.saturating_sub(t) < window);
        }

        self.last_used.insert(key, now);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.last_used.len()
    }
}

/// Shared per-user cooldown across all commands
pub async fn check_cooldown(user_id: UserId) -> Result<(), u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    COMMAND_COOLDOWNS.lock().await.check(user_id, now)
}

//! In-memory session store
//!
//! ユーザーIDごとに Mutex 付きの記録を1件持つ。ハンドラがロックを
//! 遷移全体（生成呼び出しを含む）にわたって保持することで、同一
//! ユーザーのメッセージは直列化され、別ユーザー同士は競合しない。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::types::Session;

/// In-memory session store keyed by the platform user id
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<DashMap<String, Arc<Mutex<Session>>>>,
}

impl InMemorySessionStore {
    /// Create a new session store
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Get the handle for a user, creating a default record on first
    /// contact. Lock the handle to read the session or commit a new one.
    pub fn get_or_create(&self, user_id: &str) -> Arc<Mutex<Session>> {
        self.sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                debug!(user_id, "creating session");
                Arc::new(Mutex::new(Session::new(user_id)))
            })
            .value()
            .clone()
    }

    /// Replace the record with first-contact defaults
    pub async fn reset(&self, user_id: &str) -> Session {
        let handle = self.get_or_create(user_id);
        let mut session = handle.lock().await;
        session.reset();
        session.clone()
    }

    /// Number of known sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Clone for InMemorySessionStore {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::Phase;
    use std::time::Duration;

    #[tokio::test]
    async fn test_get_or_create_returns_same_record() {
        let store = InMemorySessionStore::new();

        {
            let handle = store.get_or_create("U1");
            let mut session = handle.lock().await;
            session.answers.push("first".to_string());
        }

        let handle = store.get_or_create("U1");
        let session = handle.lock().await;
        assert_eq!(session.answers, vec!["first".to_string()]);
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn test_reset_yields_defaults() {
        let store = InMemorySessionStore::new();

        {
            let handle = store.get_or_create("U1");
            let mut session = handle.lock().await;
            session.phase = Phase::Paid;
            session.used_count = 3;
        }

        let session = store.reset("U1").await;
        assert_eq!(session.phase, Phase::Start);
        assert_eq!(session.used_count, 0);

        // reset of reset is still the default record
        let session = store.reset("U1").await;
        assert_eq!(session.phase, Phase::Start);
    }

    #[tokio::test]
    async fn test_same_user_transitions_are_serialized() {
        let store = InMemorySessionStore::new();
        store.get_or_create("U1");

        let mut tasks = Vec::new();
        for i in 0..2 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let handle = store.get_or_create("U1");
                let mut session = handle.lock().await;
                // ロック中に待つことで、競合していれば消える更新を作る
                let snapshot = session.answers.len();
                tokio::time::sleep(Duration::from_millis(10)).await;
                session.answers.push(format!("answer-{}", i));
                assert_eq!(session.answers.len(), snapshot + 1);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let handle = store.get_or_create("U1");
        let session = handle.lock().await;
        assert_eq!(session.answers.len(), 2);
    }

    #[tokio::test]
    async fn test_users_do_not_contend() {
        let store = InMemorySessionStore::new();

        let handle_a = store.get_or_create("U-a");
        let _guard_a = handle_a.lock().await;

        // 別ユーザーのロックは保持中でもすぐ取れる
        let handle_b = store.get_or_create("U-b");
        let guard_b = tokio::time::timeout(Duration::from_millis(100), handle_b.lock())
            .await
            .expect("unrelated user must not block");
        assert_eq!(guard_b.user_id, "U-b");
    }
}

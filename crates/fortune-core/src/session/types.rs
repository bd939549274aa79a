//! Session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dialogue::{Phase, Plan, Topic};

/// 1ユーザーぶんの会話記録。
///
/// フィールドを更新するのは Dialogue Engine だけ。ストアは保管と
/// ID→記録の対応だけを持つ。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// LINE user ID this session belongs to
    pub user_id: String,
    /// Current node in the dialogue state machine
    pub phase: Phase,
    /// Topic chosen on the menu; immutable until reset
    pub topic: Option<Topic>,
    /// Hearing answers, append-only; length is the completion signal
    pub answers: Vec<String>,
    /// Plan chosen during plan selection; immutable until reset
    pub selected_plan: Option<Plan>,
    /// Paid readings consumed on the selected plan
    pub used_count: u32,
    /// Whether the one free reading has been delivered
    pub free_used: bool,
    /// Session creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a first-contact session
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            phase: Phase::Start,
            topic: None,
            answers: Vec::new(),
            selected_plan: None,
            used_count: 0,
            free_used: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Clone as the starting point of the next transition
    pub fn next(&self) -> Self {
        let mut session = self.clone();
        session.touch();
        session
    }

    /// Bump the update timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// 初回接触時の状態に戻す。ユーザーIDと作成時刻だけが残る。
    pub fn reset(&mut self) {
        self.phase = Phase::Start;
        self.topic = None;
        self.answers.clear();
        self.selected_plan = None;
        self.used_count = 0;
        self.free_used = false;
        self.touch();
    }

    /// Paid readings left on the selected plan
    pub fn remaining_quota(&self) -> Option<u32> {
        self.selected_plan
            .map(|plan| plan.quota().saturating_sub(self.used_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_contact_defaults() {
        let session = Session::new("U123");
        assert_eq!(session.user_id, "U123");
        assert_eq!(session.phase, Phase::Start);
        assert!(session.topic.is_none());
        assert!(session.answers.is_empty());
        assert!(session.selected_plan.is_none());
        assert_eq!(session.used_count, 0);
        assert!(!session.free_used);
    }

    #[test]
    fn test_reset_clears_everything_but_identity() {
        let mut session = Session::new("U123");
        session.phase = Phase::Paid;
        session.topic = Some(Topic::Love);
        session.answers.push("answer".to_string());
        session.selected_plan = Some(Plan::Silver);
        session.used_count = 2;
        session.free_used = true;
        let created_at = session.created_at;

        session.reset();

        assert_eq!(session.user_id, "U123");
        assert_eq!(session.created_at, created_at);
        assert_eq!(session.phase, Phase::Start);
        assert!(session.topic.is_none());
        assert!(session.answers.is_empty());
        assert!(session.selected_plan.is_none());
        assert_eq!(session.used_count, 0);
        assert!(!session.free_used);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = Session::new("U123");
        session.phase = Phase::Hearing;
        session.reset();
        let after_first = session.clone();
        session.reset();

        assert_eq!(session.phase, after_first.phase);
        assert_eq!(session.answers, after_first.answers);
        assert_eq!(session.used_count, after_first.used_count);
    }

    #[test]
    fn test_remaining_quota() {
        let mut session = Session::new("U123");
        assert_eq!(session.remaining_quota(), None);

        session.selected_plan = Some(Plan::Silver);
        session.used_count = 2;
        assert_eq!(session.remaining_quota(), Some(1));

        session.used_count = 3;
        assert_eq!(session.remaining_quota(), Some(0));
    }
}

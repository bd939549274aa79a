//! Conversation phases and reading topics

use serde::{Deserialize, Serialize};

/// Node in the dialogue state machine.
///
/// `Done` has no inbound transition; it is kept so a record restored from
/// a durable store can always be matched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Start,
    Menu,
    Hearing,
    FreeDone,
    SelectPlan,
    WaitingPayment,
    Paid,
    Done,
}

/// Reading topic chosen from the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Love,
    Relationship,
    Job,
    Personality,
    Palm,
}

impl Topic {
    /// ヒアリングで集める回答数。この数に達した時点で無料鑑定に進む。
    pub fn question_count(&self) -> usize {
        match self {
            Topic::Love => 3,
            Topic::Relationship => 2,
            Topic::Job => 2,
            Topic::Personality => 1,
            Topic::Palm => 1,
        }
    }

    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            Topic::Love => "恋愛",
            Topic::Relationship => "相性",
            Topic::Job => "仕事・生き方",
            Topic::Personality => "性格・本質",
            Topic::Palm => "手相",
        }
    }

    /// Map a menu number (1-5) to a topic
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Topic::Love),
            2 => Some(Topic::Relationship),
            3 => Some(Topic::Job),
            4 => Some(Topic::Personality),
            5 => Some(Topic::Palm),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_phase() {
        assert_eq!(Phase::default(), Phase::Start);
    }

    #[test]
    fn test_topic_from_number() {
        assert_eq!(Topic::from_number(1), Some(Topic::Love));
        assert_eq!(Topic::from_number(5), Some(Topic::Palm));
        assert_eq!(Topic::from_number(6), None);
        assert_eq!(Topic::from_number(0), None);
    }

    #[test]
    fn test_question_counts() {
        assert_eq!(Topic::Love.question_count(), 3);
        assert_eq!(Topic::Relationship.question_count(), 2);
        assert_eq!(Topic::Personality.question_count(), 1);
    }
}

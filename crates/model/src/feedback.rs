use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An overall satisfaction rating for a conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// The user was satisfied.
    Satisfied,
    /// The user was neither satisfied nor unsatisfied.
    Neutral,
    /// The user was unsatisfied.
    Unsatisfied,
}

impl Rating {
    /// Parses a rating from its wire name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        [Rating::Satisfied, Rating::Neutral, Rating::Unsatisfied]
            .into_iter()
            .find(|rating| rating.name().eq_ignore_ascii_case(name))
    }

    /// Returns the wire name of this rating.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Rating::Satisfied => "satisfied",
            Rating::Neutral => "neutral",
            Rating::Unsatisfied => "unsatisfied",
        }
    }
}

/// Satisfaction survey result.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SatisfactionFeedback {
    /// The rating given.
    pub rating: Rating,
    /// When the rating was given.
    pub timestamp: DateTime<Utc>,
}

impl SatisfactionFeedback {
    /// Creates a feedback stamped with the current time.
    #[inline]
    pub fn now(rating: Rating) -> Self {
        Self {
            rating,
            timestamp: Utc::now(),
        }
    }
}

/// Whether one assistant response was related to the user's query.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelevanceFeedback {
    /// Index of the rated message in the conversation.
    pub message_index: usize,
    /// Whether the response was relevant.
    pub is_relevant: bool,
    /// When the feedback was given.
    pub timestamp: DateTime<Utc>,
}

impl RelevanceFeedback {
    /// Creates a feedback stamped with the current time.
    #[inline]
    pub fn now(message_index: usize, is_relevant: bool) -> Self {
        Self {
            message_index,
            is_relevant,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn test_rating_names() {
        assert_eq!(Rating::from_name("Neutral"), Some(Rating::Neutral));
        assert_eq!(Rating::from_name("meh"), None);
        for rating in [Rating::Satisfied, Rating::Neutral, Rating::Unsatisfied]
        {
            assert_eq!(Rating::from_name(rating.name()), Some(rating));
        }
    }

    #[test]
    fn test_serialize_relevance() {
        let feedback = RelevanceFeedback::now(3, false);
        let value = serde_json::to_value(&feedback).unwrap();
        assert_eq!(value["message_index"], json!(3));
        assert_eq!(value["is_relevant"], json!(false));
        let Value::String(timestamp) = &value["timestamp"] else {
            panic!("timestamp should be a string: {value}");
        };
        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
    }
}

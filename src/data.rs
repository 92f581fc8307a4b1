use serde::{Deserialize, Serialize};

pub use crate::types::{LangTag, TweetId, UserId};

/// A staged tweet, tokenized into `text`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    /// Status id.
    pub id: TweetId,
    /// Author id (the grouping key for fold splitting).
    pub uid: UserId,
    /// Tokens of the tweet text.
    pub text: Vec<String>,
    /// Language reported by the platform.
    pub lang: LangTag,
    /// Whether the platform truncated the text.
    #[serde(default)]
    pub truncated: bool,
    /// Status this tweet replies to, if any.
    #[serde(default)]
    pub in_reply_to_status_id: Option<TweetId>,
    /// User this tweet replies to, if any.
    #[serde(default)]
    pub in_reply_to_user_id: Option<UserId>,
    /// Whether this is a retweet.
    #[serde(default)]
    pub retweeted: bool,
}

impl Tweet {
    /// Grouping key used to keep one user's tweets in a single partition.
    pub fn user_key(&self) -> UserId {
        self.uid
    }
}

/// A labelled example: one point and its class label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Example<P, L> {
    /// The data point, usually a [`Tweet`].
    pub point: P,
    /// Class label of `point`.
    pub label: L,
}

/// Unzip examples into positionally aligned `(points, labels)`.
pub fn split_columns<P, L>(examples: Vec<Example<P, L>>) -> (Vec<P>, Vec<L>) {
    examples
        .into_iter()
        .map(|example| (example.point, example.label))
        .unzip()
}

/// Position of a point in the caller's `points`/`labels` sequences.
/// Example: `17` (the 18th staged example)
pub type PointIndex = usize;
/// Identifier of one of the `k` intermediate buckets, in `0..k`.
/// Example: `3`
pub type BucketId = usize;
/// Desirability of placing a group into a bucket (lower is better).
/// Example: `0.2875`
pub type Score = f64;
/// Twitter user identifier; the default grouping key for staged tweets.
/// Example: `783214`
pub type UserId = u64;
/// Twitter status identifier.
/// Example: `1140275530469015552`
pub type TweetId = u64;
/// ISO language tag attached to a tweet.
/// Examples: `en`, `und`
pub type LangTag = String;

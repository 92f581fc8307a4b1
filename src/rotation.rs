use crate::types::BucketId;

/// Yields the `k` cyclic rotations of `0..k`, one per fold.
///
/// Rotation `i` is `[(i + d) % k for d in 0..k]`. The iterator stops after
/// exactly `k` rotations and cannot be restarted.
#[derive(Clone, Debug)]
pub struct CircularRotations {
    k: usize,
    offset: usize,
}

impl CircularRotations {
    /// Create a rotation generator over `k` buckets.
    pub fn new(k: usize) -> Self {
        Self { k, offset: 0 }
    }
}

impl Iterator for CircularRotations {
    type Item = Vec<BucketId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.k {
            return None;
        }
        let rotation = (0..self.k).map(|d| (self.offset + d) % self.k).collect();
        self.offset += 1;
        Some(rotation)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.k - self.offset;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CircularRotations {}

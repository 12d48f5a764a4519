use crate::ids::UserId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

/// Users who liked a review. Membership is unique and toggled in O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeSet(HashSet<UserId>);

impl LikeSet {
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    /// Flip `user`'s membership. Returns true when the user now likes the review.
    pub fn toggle(&mut self, user: &UserId) -> bool {
        if self.0.remove(user) {
            false
        } else {
            self.0.insert(user.clone());
            true
        }
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.0.contains(user)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.0.iter()
    }
}

impl FromIterator<UserId> for LikeSet {
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// Sorted on the way out so persisted documents diff cleanly
impl Serialize for LikeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut users: Vec<&UserId> = self.0.iter().collect();
        users.sort();
        users.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LikeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let users = Vec::<UserId>::deserialize(deserializer)?;
        Ok(users.into_iter().collect())
    }
}

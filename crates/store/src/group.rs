//! Group and member records.

use divvy_shared::types::{GroupId, MemberId};
use serde::Serialize;

/// A member of an expense group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// The member's ID, unique within the group.
    pub id: MemberId,
    /// Display name shown on balances and suggestions.
    pub name: String,
}

/// An expense group: a named set of members sharing a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    /// The group ID.
    pub id: GroupId,
    /// The group name.
    pub name: String,
    /// The member roster.
    pub members: Vec<Member>,
}

impl Group {
    /// Returns true if the given member belongs to this group.
    #[must_use]
    pub fn has_member(&self, member: MemberId) -> bool {
        self.members.iter().any(|m| m.id == member)
    }
}

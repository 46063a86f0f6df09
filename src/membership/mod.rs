// Group Membership Manager - capacity and exclusivity invariants
//
// All group mutations are validate-then-mutate: either the whole operation
// succeeds or the group is left untouched. The manager also owns the reverse
// index backing the at-most-one-group invariant, so both checks happen under
// the same lock as the mutation they guard.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::ids::{GroupId, ParticipantId};

/// A fixed-capacity set of participants sharing sessions.
///
/// Members are kept in insertion order with set semantics; the roster
/// snapshot taken at session scheduling re-orders by registration sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub capacity: usize,
    members: Vec<ParticipantId>,
}

impl Group {
    fn new(id: GroupId, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            members: Vec::new(),
        }
    }

    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.members.contains(&participant)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MembershipError {
    #[error("unknown group: {0}")]
    GroupNotFound(GroupId),
    #[error("invalid group capacity: {requested} (must be between 1 and {max})")]
    InvalidCapacity { requested: usize, max: usize },
    #[error("group {group} is at capacity ({capacity})")]
    GroupFull { group: GroupId, capacity: usize },
    #[error("participant {participant} is already a member of group {group}")]
    AlreadyMember {
        group: GroupId,
        participant: ParticipantId,
    },
    #[error("participant {participant} is already enrolled in group {other_group}")]
    ParticipantAlreadyInOtherGroup {
        participant: ParticipantId,
        other_group: GroupId,
    },
    #[error("participant {participant} is not a member of group {group}")]
    NotAMember {
        group: GroupId,
        participant: ParticipantId,
    },
}

/// In-memory group store plus the participant -> group exclusivity index
#[derive(Debug, Default)]
pub struct GroupMembershipManager {
    groups: HashMap<GroupId, Group>,
    enrollment: HashMap<ParticipantId, GroupId>,
    /// Upper bound on group capacity; None means unbounded
    max_capacity: Option<usize>,
}

impl GroupMembershipManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager with a configured ceiling on group capacity
    pub fn with_max_capacity(max_capacity: Option<usize>) -> Self {
        Self {
            max_capacity,
            ..Self::default()
        }
    }

    pub fn create_group(&mut self, capacity: usize) -> Result<GroupId, MembershipError> {
        let max = self.max_capacity.unwrap_or(usize::MAX);
        if capacity < 1 || capacity > max {
            return Err(MembershipError::InvalidCapacity {
                requested: capacity,
                max,
            });
        }
        let id = GroupId::new();
        self.groups.insert(id, Group::new(id, capacity));
        tracing::info!(group_id = %id, capacity, "Group created");
        Ok(id)
    }

    pub fn group(&self, id: GroupId) -> Result<&Group, MembershipError> {
        self.groups.get(&id).ok_or(MembershipError::GroupNotFound(id))
    }

    /// Group a participant is currently enrolled in, if any
    pub fn group_of(&self, participant: ParticipantId) -> Option<GroupId> {
        self.enrollment.get(&participant).copied()
    }

    pub fn add_member(
        &mut self,
        group_id: GroupId,
        participant: ParticipantId,
    ) -> Result<(), MembershipError> {
        // All checks before any mutation so a failed call changes nothing
        let group = self
            .groups
            .get(&group_id)
            .ok_or(MembershipError::GroupNotFound(group_id))?;
        if group.contains(participant) {
            return Err(MembershipError::AlreadyMember {
                group: group_id,
                participant,
            });
        }
        if let Some(other_group) = self.enrollment.get(&participant) {
            return Err(MembershipError::ParticipantAlreadyInOtherGroup {
                participant,
                other_group: *other_group,
            });
        }
        if group.is_full() {
            return Err(MembershipError::GroupFull {
                group: group_id,
                capacity: group.capacity,
            });
        }

        self.enrollment.insert(participant, group_id);
        if let Some(group) = self.groups.get_mut(&group_id) {
            group.members.push(participant);
        }
        tracing::info!(
            group_id = %group_id,
            participant_id = %participant,
            "Member added to group"
        );
        Ok(())
    }

    pub fn remove_member(
        &mut self,
        group_id: GroupId,
        participant: ParticipantId,
    ) -> Result<(), MembershipError> {
        let group = self
            .groups
            .get_mut(&group_id)
            .ok_or(MembershipError::GroupNotFound(group_id))?;
        let position = group
            .members
            .iter()
            .position(|m| *m == participant)
            .ok_or(MembershipError::NotAMember {
                group: group_id,
                participant,
            })?;
        group.members.remove(position);
        self.enrollment.remove(&participant);
        tracing::info!(
            group_id = %group_id,
            participant_id = %participant,
            "Member removed from group"
        );
        Ok(())
    }

    /// Current members in insertion order. The lifecycle engine freezes this
    /// at scheduling time; later roster edits never touch the frozen copy.
    pub fn snapshot_roster(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<ParticipantId>, MembershipError> {
        self.group(group_id).map(|g| g.members.clone())
    }
}

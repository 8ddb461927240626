use crate::foundation::core::TimeRange;
use crate::pipeline::group::Group;

/// Stable handle to a group owned by a timeline.
///
/// Ids are arena indices; removed slots are never reused, so a stale id simply misses.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct GroupId(pub usize);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// Arena of groups, iterated in insertion order.
#[derive(Default)]
pub(crate) struct GroupTable {
    slots: Vec<Option<Box<dyn Group>>>,
}

impl GroupTable {
    pub(crate) fn insert(&mut self, group: Box<dyn Group>) -> GroupId {
        let id = GroupId(self.slots.len());
        self.slots.push(Some(group));
        id
    }

    pub(crate) fn remove(&mut self, id: GroupId) -> Option<Box<dyn Group>> {
        self.slots.get_mut(id.0)?.take()
    }

    pub(crate) fn get(&self, id: GroupId) -> Option<&dyn Group> {
        match self.slots.get(id.0) {
            Some(Some(g)) => Some(g.as_ref()),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, id: GroupId) -> Option<&mut dyn Group> {
        match self.slots.get_mut(id.0) {
            Some(Some(g)) => Some(g.as_mut()),
            _ => None,
        }
    }

    pub(crate) fn ids(&self) -> Vec<GroupId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (GroupId, &dyn Group)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_deref().map(|g| (GroupId(i), g)))
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Coverage test across every group.
    pub(crate) fn covers(&self, range: TimeRange) -> bool {
        self.iter().any(|(_, g)| g.covers(range))
    }

    /// `[min start, max stop)` over all groups; `[0, +inf)` when empty.
    pub(crate) fn aggregate_range(&self) -> TimeRange {
        let mut it = self.iter().map(|(_, g)| g.range());
        let Some(first) = it.next() else {
            return TimeRange::default();
        };
        it.fold(first, |acc, r| TimeRange {
            start: acc.start.min(r.start),
            stop: acc.stop.max(r.stop),
        })
    }

    pub(crate) fn clear(&mut self) -> Vec<(GroupId, Box<dyn Group>)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.take().map(|g| (GroupId(i), g)))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/group_table.rs"]
mod tests;

use std::collections::{HashMap, HashSet};

use crate::model::{Entity, EntityId, Stage};

/// Maps every parent id referenced by `children` to its parent record.
///
/// Rebuilt from the current lists on every render pass, so it always agrees
/// with whatever was last fetched or appended. On duplicate parent ids the
/// later record in `parents` wins.
pub fn build_lookup<'p, C, P, F>(
    children: &[C],
    parents: &'p [P],
    parent_of: F,
) -> HashMap<EntityId, &'p P>
where
    P: Entity,
    F: Fn(&C) -> Option<EntityId>,
{
    let wanted: HashSet<EntityId> = children.iter().filter_map(&parent_of).collect();
    let mut lookup = HashMap::with_capacity(wanted.len());
    for parent in parents {
        let id = parent.id();
        if wanted.contains(&id) {
            lookup.insert(id, parent);
        }
    }
    lookup
}

/// Label of the referenced parent, or `placeholder` when the reference is
/// unset or points outside the fetched list.
pub fn parent_label<P, F>(
    lookup: &HashMap<EntityId, &P>,
    parent_id: Option<EntityId>,
    label: F,
    placeholder: &str,
) -> String
where
    F: Fn(&P) -> &str,
{
    parent_id
        .and_then(|id| lookup.get(&id))
        .map(|parent| label(*parent).to_string())
        .unwrap_or_else(|| placeholder.to_string())
}

/// Stages in display order: ascending `order`, ties keep fetch order.
pub fn stages_in_order(stages: &[Stage]) -> Vec<&Stage> {
    let mut sorted: Vec<&Stage> = stages.iter().collect();
    sorted.sort_by_key(|stage| stage.order);
    sorted
}

//! Copy-on-write structural edits.
//!
//! Every operation leaves `self` untouched and returns a new definition. Only
//! the nodes on the path from the root to the edited list are copied; every
//! other subtree is shared through its `Arc`.
use super::WorkflowDefinition;
use super::visit::flatten;
use crate::error::EditError;
use crate::step::{ConditionPath, StepConfig, StepList, StepNode, StepType};
use ahash::AHashSet;
use std::sync::Arc;
use tracing::debug;

/// Addresses one ordered list of sibling steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StepSlot {
    /// The workflow's root steps.
    Root,
    /// The body of a `for_each` step.
    ForEachBody(String),
    /// The steps of one condition path of a router.
    ConditionPath { router_id: String, path_id: String },
    /// The default path of a router.
    DefaultPath(String),
}

impl StepSlot {
    fn owner(&self) -> Option<&str> {
        match self {
            StepSlot::Root => None,
            StepSlot::ForEachBody(id) | StepSlot::DefaultPath(id) => Some(id),
            StepSlot::ConditionPath { router_id, .. } => Some(router_id),
        }
    }
}

/// Outcome of an edit callback on the node it targets.
enum NodeEdit {
    Replace(StepNode),
    Remove,
}

type EditFn<'f> = dyn FnMut(&StepNode) -> Result<NodeEdit, EditError> + 'f;

/// Applies `edit` to the first node with `id`, rebuilding only its ancestors.
/// Returns `Ok(None)` when no node has that id.
fn map_node(
    list: &[Arc<StepNode>],
    id: &str,
    edit: &mut EditFn<'_>,
) -> Result<Option<StepList>, EditError> {
    for (index, node) in list.iter().enumerate() {
        if node.id == id {
            let mut rebuilt = list.to_vec();
            match edit(node)? {
                NodeEdit::Replace(replacement) => rebuilt[index] = Arc::new(replacement),
                NodeEdit::Remove => {
                    rebuilt.remove(index);
                }
            }
            return Ok(Some(rebuilt));
        }

        for (child_index, children) in node.child_lists().into_iter().enumerate() {
            if let Some(new_children) = map_node(children, id, edit)? {
                let mut copy = StepNode::clone(node);
                if let Some(slot) = copy.child_lists_mut().into_iter().nth(child_index) {
                    *slot = new_children;
                }
                let mut rebuilt = list.to_vec();
                rebuilt[index] = Arc::new(copy);
                return Ok(Some(rebuilt));
            }
        }
    }
    Ok(None)
}

fn not_a_container(node: &StepNode) -> EditError {
    EditError::NotAContainer {
        step_id: node.id.clone(),
        type_name: node.step_type().to_string(),
    }
}

/// The list a slot names inside its owning container.
fn slot_list_mut<'n>(node: &'n mut StepNode, slot: &StepSlot) -> Result<&'n mut StepList, EditError> {
    let step_id = node.id.clone();
    let type_name = node.step_type().to_string();
    match (slot, &mut node.config) {
        (StepSlot::ForEachBody(_), StepConfig::ForEach(config)) => Ok(&mut config.child_steps),
        (StepSlot::DefaultPath(_), StepConfig::ConditionalPaths(config)) => {
            Ok(&mut config.default_path.steps)
        }
        (StepSlot::ConditionPath { path_id, .. }, StepConfig::ConditionalPaths(config)) => config
            .conditions
            .iter_mut()
            .find(|path| path.id == *path_id)
            .map(|path| &mut path.path_steps)
            .ok_or_else(|| EditError::PathNotFound {
                step_id,
                path_id: path_id.clone(),
            }),
        _ => Err(EditError::NotAContainer { step_id, type_name }),
    }
}

fn check_index(index: usize, len: usize) -> Result<(), EditError> {
    if index > len {
        return Err(EditError::IndexOutOfBounds { index, len });
    }
    Ok(())
}

impl WorkflowDefinition {
    /// Runs `edit` on the node with `id`; fails if there is none.
    fn edit_node<F>(&self, id: &str, mut edit: F) -> Result<Self, EditError>
    where
        F: FnMut(&StepNode) -> Result<NodeEdit, EditError>,
    {
        map_node(&self.steps, id, &mut edit)?
            .map(WorkflowDefinition::from_list)
            .ok_or_else(|| EditError::StepNotFound(id.to_string()))
    }

    /// Runs `edit` on the list a slot names.
    fn edit_slot<F>(&self, slot: &StepSlot, mut edit: F) -> Result<Self, EditError>
    where
        F: FnMut(&mut StepList) -> Result<(), EditError>,
    {
        match slot.owner() {
            None => {
                let mut steps = self.steps.clone();
                edit(&mut steps)?;
                Ok(WorkflowDefinition::from_list(steps))
            }
            Some(owner) => self.edit_node(owner, |node| {
                let mut copy = node.clone();
                edit(slot_list_mut(&mut copy, slot)?)?;
                Ok(NodeEdit::Replace(copy))
            }),
        }
    }

    /// Runs `edit` on a router's config.
    fn edit_router<F>(&self, router_id: &str, mut edit: F) -> Result<Self, EditError>
    where
        F: FnMut(&str, &mut Vec<ConditionPath>) -> Result<(), EditError>,
    {
        self.edit_node(router_id, |node| {
            let mut copy = node.clone();
            match &mut copy.config {
                StepConfig::ConditionalPaths(config) => edit(&node.id, &mut config.conditions)?,
                _ => return Err(not_a_container(node)),
            }
            Ok(NodeEdit::Replace(copy))
        })
    }

    /// Ids in the `incoming` subtrees must be unique across the whole batch and
    /// absent from the workflow, apart from the subtree being replaced (`replacing`).
    fn check_new_ids(
        &self,
        incoming: &[Arc<StepNode>],
        replacing: Option<&str>,
    ) -> Result<(), EditError> {
        let replaced: AHashSet<&str> = replacing
            .and_then(|id| self.find_step(id))
            .map(|old| {
                flatten(std::slice::from_ref(old))
                    .into_iter()
                    .map(|(s, _)| s.id.as_str())
                    .collect()
            })
            .unwrap_or_default();
        let existing: AHashSet<&str> = self
            .step_ids()
            .into_iter()
            .filter(|id| !replaced.contains(id))
            .collect();

        let mut fresh = AHashSet::new();
        for (node, _) in flatten(incoming) {
            if existing.contains(node.id.as_str()) || !fresh.insert(node.id.as_str()) {
                return Err(EditError::DuplicateStepId(node.id.clone()));
            }
        }
        Ok(())
    }

    /// Adds a step at the end of a list.
    pub fn append_step(&self, slot: &StepSlot, step: StepNode) -> Result<Self, EditError> {
        let step = Arc::new(step);
        self.check_new_ids(std::slice::from_ref(&step), None)?;
        debug!(step_id = %step.id, ?slot, "appending step");
        self.edit_slot(slot, |list| {
            list.push(Arc::clone(&step));
            Ok(())
        })
    }

    /// Inserts a step before position `index` of a list. `index == len` appends.
    pub fn insert_step(
        &self,
        slot: &StepSlot,
        index: usize,
        step: StepNode,
    ) -> Result<Self, EditError> {
        let step = Arc::new(step);
        self.check_new_ids(std::slice::from_ref(&step), None)?;
        debug!(step_id = %step.id, ?slot, index, "inserting step");
        self.edit_slot(slot, |list| {
            check_index(index, list.len())?;
            list.insert(index, Arc::clone(&step));
            Ok(())
        })
    }

    /// Replaces a step with the result of `f`. The replacement may change the
    /// step's id, as long as the new id stays unique.
    pub fn update_step<F>(&self, id: &str, f: F) -> Result<Self, EditError>
    where
        F: FnOnce(&StepNode) -> StepNode,
    {
        let current = self
            .find_step(id)
            .ok_or_else(|| EditError::StepNotFound(id.to_string()))?;
        let replacement = Arc::new(f(current));
        self.check_new_ids(std::slice::from_ref(&replacement), Some(id))?;
        let mut replacement = Some(replacement);
        self.edit_node(id, |_| {
            replacement
                .take()
                .map(|step| NodeEdit::Replace(Arc::unwrap_or_clone(step)))
                .ok_or_else(|| EditError::StepNotFound(id.to_string()))
        })
    }

    pub fn rename_step(&self, id: &str, name: impl Into<String>) -> Result<Self, EditError> {
        let name = name.into();
        self.edit_node(id, |node| {
            let mut copy = node.clone();
            copy.name = name.clone();
            Ok(NodeEdit::Replace(copy))
        })
    }

    /// Changes a step's type. The old config, including any child steps, is
    /// replaced by an empty config of the new type.
    pub fn change_step_type(&self, id: &str, step_type: StepType) -> Result<Self, EditError> {
        self.edit_node(id, |node| {
            if node.step_type() == step_type {
                return Ok(NodeEdit::Replace(node.clone()));
            }
            debug!(step_id = %node.id, from = %node.step_type(), to = %step_type, "changing step type");
            Ok(NodeEdit::Replace(node.with_type(step_type)))
        })
    }

    /// Removes a step and its whole subtree.
    pub fn remove_step(&self, id: &str) -> Result<Self, EditError> {
        debug!(step_id = id, "removing step");
        self.edit_node(id, |_| Ok(NodeEdit::Remove))
    }

    /// Moves the step at `from` to position `to` within one list.
    pub fn move_step(&self, slot: &StepSlot, from: usize, to: usize) -> Result<Self, EditError> {
        self.edit_slot(slot, |list| {
            let len = list.len();
            if from >= len {
                return Err(EditError::IndexOutOfBounds { index: from, len });
            }
            if to >= len {
                return Err(EditError::IndexOutOfBounds { index: to, len });
            }
            let step = list.remove(from);
            list.insert(to, step);
            Ok(())
        })
    }

    /// Adds a condition path after the router's existing paths.
    pub fn add_condition_path(
        &self,
        router_id: &str,
        path: ConditionPath,
    ) -> Result<Self, EditError> {
        self.check_new_ids(&path.path_steps, None)?;
        self.edit_router(router_id, |step_id, paths| {
            if paths.iter().any(|p| p.id == path.id) {
                return Err(EditError::DuplicatePathId {
                    step_id: step_id.to_string(),
                    path_id: path.id.clone(),
                });
            }
            paths.push(path.clone());
            Ok(())
        })
    }

    pub fn remove_condition_path(&self, router_id: &str, path_id: &str) -> Result<Self, EditError> {
        self.edit_router(router_id, |step_id, paths| {
            let index = paths
                .iter()
                .position(|p| p.id == path_id)
                .ok_or_else(|| EditError::PathNotFound {
                    step_id: step_id.to_string(),
                    path_id: path_id.to_string(),
                })?;
            paths.remove(index);
            Ok(())
        })
    }

    /// Reorders a router's paths. Order decides which path wins when several match.
    pub fn move_condition_path(
        &self,
        router_id: &str,
        from: usize,
        to: usize,
    ) -> Result<Self, EditError> {
        self.edit_router(router_id, |_, paths| {
            let len = paths.len();
            if from >= len {
                return Err(EditError::IndexOutOfBounds { index: from, len });
            }
            if to >= len {
                return Err(EditError::IndexOutOfBounds { index: to, len });
            }
            let path = paths.remove(from);
            paths.insert(to, path);
            Ok(())
        })
    }

    /// Replaces one condition path with the result of `f`.
    pub fn update_condition_path<F>(
        &self,
        router_id: &str,
        path_id: &str,
        f: F,
    ) -> Result<Self, EditError>
    where
        F: FnOnce(&ConditionPath) -> ConditionPath,
    {
        let mut f = Some(f);
        self.edit_router(router_id, |step_id, paths| {
            let not_found = || EditError::PathNotFound {
                step_id: step_id.to_string(),
                path_id: path_id.to_string(),
            };
            let index = paths
                .iter()
                .position(|p| p.id == path_id)
                .ok_or_else(not_found)?;
            let f = f.take().ok_or_else(not_found)?;
            let updated = f(&paths[index]);
            if updated.id != path_id && paths.iter().any(|p| p.id == updated.id) {
                return Err(EditError::DuplicatePathId {
                    step_id: step_id.to_string(),
                    path_id: updated.id,
                });
            }
            paths[index] = updated;
            Ok(())
        })
    }
}

use crate::step::StepNode;
use std::sync::Arc;

/// Receives every step of a tree in depth-first document order, with its
/// depth and its enclosing container (`None` for root steps).
pub trait StepVisitor<'a> {
    fn visit_step(&mut self, step: &'a StepNode, depth: usize, parent: Option<&'a StepNode>);
}

impl<'a, F> StepVisitor<'a> for F
where
    F: FnMut(&'a StepNode, usize, Option<&'a StepNode>),
{
    fn visit_step(&mut self, step: &'a StepNode, depth: usize, parent: Option<&'a StepNode>) {
        self(step, depth, parent)
    }
}

/// Walks `steps` and all nested child lists, parents before children.
pub fn walk<'a, V>(steps: &'a [Arc<StepNode>], visitor: &mut V)
where
    V: StepVisitor<'a> + ?Sized,
{
    walk_at(steps, 0, None, visitor);
}

fn walk_at<'a, V>(
    steps: &'a [Arc<StepNode>],
    depth: usize,
    parent: Option<&'a StepNode>,
    visitor: &mut V,
) where
    V: StepVisitor<'a> + ?Sized,
{
    for step in steps {
        visitor.visit_step(step, depth, parent);
        for children in step.child_lists() {
            walk_at(children, depth + 1, Some(step), visitor);
        }
    }
}

struct Collector<'a> {
    steps: Vec<(&'a StepNode, usize)>,
}

impl<'a> StepVisitor<'a> for Collector<'a> {
    fn visit_step(&mut self, step: &'a StepNode, depth: usize, _parent: Option<&'a StepNode>) {
        self.steps.push((step, depth));
    }
}

/// Every step of a tree with its depth, in the order [`walk`] visits them.
pub fn flatten(steps: &[Arc<StepNode>]) -> Vec<(&StepNode, usize)> {
    let mut collector = Collector { steps: Vec::new() };
    walk(steps, &mut collector);
    collector.steps
}

/// Finds a step by id at any depth, stopping at the first hit.
pub fn find_step<'a>(steps: &'a [Arc<StepNode>], id: &str) -> Option<&'a Arc<StepNode>> {
    steps.iter().find_map(|step| {
        if step.id == id {
            Some(step)
        } else {
            step.child_lists()
                .into_iter()
                .find_map(|children| find_step(children, id))
        }
    })
}

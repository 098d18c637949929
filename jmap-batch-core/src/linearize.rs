// Orders a batch so every producer is sent ahead of its consumers and
// rewrites result references into wire back-references.

use crate::error::{BatchError, ConstructionError};
use crate::ids::CorrelationId;
use crate::invocation::{Invocation, ParamValue};
use crate::wire::{Arguments, BackReference, MethodCall, REFERENCE_PREFIX};
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Produces the wire order of a batch.
///
/// Producers are hoisted ahead of every root, in depth-first postorder of
/// first requirement. Roots keep the caller's relative order. A producer that
/// is also a root moves forward with the other producers.
#[derive(Debug)]
pub struct Linearizer<'a> {
    /// Every invocation of the batch, keyed by correlation id.
    members: HashMap<&'a CorrelationId, &'a Invocation>,
    marks: HashMap<&'a CorrelationId, Mark>,
    /// Ids currently on the traversal stack, for cycle reports.
    stack: Vec<&'a CorrelationId>,
    order: Vec<&'a Invocation>,
}

impl<'a> Linearizer<'a> {
    fn new() -> Self {
        Self {
            members: HashMap::new(),
            marks: HashMap::new(),
            stack: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Linearize `roots` and everything they reference into wire method calls.
    pub fn linearize(roots: &'a [Invocation]) -> Result<Vec<MethodCall>, BatchError> {
        Ok(Self::linearize_with_order(roots)?.1)
    }

    /// Like [`Linearizer::linearize`], also returning the invocation behind each call.
    pub fn linearize_with_order(
        roots: &'a [Invocation],
    ) -> Result<(Vec<&'a Invocation>, Vec<MethodCall>), BatchError> {
        let linearizer = Self::run(roots)?;
        let calls = linearizer
            .order
            .iter()
            .map(|invocation| linearizer.rewrite(invocation))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((linearizer.order, calls))
    }

    /// Dependency order over `roots` and their transitive producers.
    pub fn order(roots: &'a [Invocation]) -> Result<Vec<&'a Invocation>, BatchError> {
        Ok(Self::run(roots)?.order)
    }

    fn run(roots: &'a [Invocation]) -> Result<Self, BatchError> {
        let mut linearizer = Self::new();
        for root in roots {
            linearizer.collect(root)?;
        }

        // Producers of every root first, without emitting the root itself.
        for root in roots {
            if linearizer.marks.get(root.id()) == Some(&Mark::Done) {
                continue;
            }
            linearizer.marks.insert(root.id(), Mark::InProgress);
            linearizer.stack.push(root.id());
            linearizer.visit_producers(root)?;
            linearizer.stack.pop();
            linearizer.marks.remove(root.id());
        }

        for root in roots {
            if linearizer.marks.get(root.id()) != Some(&Mark::Done) {
                linearizer.marks.insert(root.id(), Mark::Done);
                linearizer.order.push(root);
            }
        }

        trace!(
            "Linearized {} roots into {} method calls",
            roots.len(),
            linearizer.order.len()
        );
        Ok(linearizer)
    }

    /// Register `invocation` and every producer reachable through handles.
    fn collect(&mut self, invocation: &'a Invocation) -> Result<(), BatchError> {
        let mut pending = vec![invocation];
        while let Some(current) = pending.pop() {
            match self.members.get(current.id()) {
                Some(known) if known.ptr_eq(current) => continue,
                Some(_) => {
                    let id = current.id().clone();
                    return Err(ConstructionError::DuplicateCorrelationId(id).into());
                }
                None => {
                    self.members.insert(current.id(), current);
                }
            }
            pending.extend(current.references().filter_map(|(_, r)| r.source()));
        }
        Ok(())
    }

    fn resolve(&self, id: &CorrelationId) -> Result<&'a Invocation, BatchError> {
        self.members
            .get(id)
            .copied()
            .ok_or_else(|| ConstructionError::UnknownReference(id.clone()).into())
    }

    fn visit_producers(&mut self, invocation: &'a Invocation) -> Result<(), BatchError> {
        for (_, reference) in invocation.references() {
            let producer = self.resolve(reference.source_id())?;
            self.visit(producer)?;
        }
        Ok(())
    }

    fn visit(&mut self, invocation: &'a Invocation) -> Result<(), BatchError> {
        match self.marks.get(invocation.id()) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = self
                    .stack
                    .iter()
                    .position(|id| *id == invocation.id())
                    .unwrap_or(0);
                let mut chain: Vec<CorrelationId> =
                    self.stack[start..].iter().map(|id| (*id).clone()).collect();
                chain.push(invocation.id().clone());
                return Err(BatchError::Cycle { chain });
            }
            None => {}
        }

        self.marks.insert(invocation.id(), Mark::InProgress);
        self.stack.push(invocation.id());
        self.visit_producers(invocation)?;
        self.stack.pop();
        self.marks.insert(invocation.id(), Mark::Done);
        self.order.push(invocation);
        Ok(())
    }

    /// Replace each result reference `key` with a `#key` back-reference literal.
    fn rewrite(&self, invocation: &Invocation) -> Result<MethodCall, BatchError> {
        let mut arguments = Arguments::with_capacity(invocation.params().len());

        for (key, value) in invocation.params() {
            let (key, value) = match value {
                ParamValue::Literal(literal) => (key.clone(), literal.clone()),
                ParamValue::Reference(reference) => {
                    let producer = self.resolve(reference.source_id())?;
                    let back = BackReference {
                        result_of: producer.id().clone(),
                        name: producer.method_name().to_string(),
                        path: reference.path().to_string(),
                    };
                    (
                        format!("{}{}", REFERENCE_PREFIX, key),
                        serde_json::to_value(back)?,
                    )
                }
            };

            if arguments.contains_key(&key) {
                return Err(ConstructionError::ConflictingParameter {
                    method: invocation.method_name().to_string(),
                    id: invocation.id().clone(),
                    parameter: key,
                }
                .into());
            }
            arguments.insert(key, value);
        }

        Ok(MethodCall {
            name: invocation.method_name().to_string(),
            arguments,
            id: invocation.id().clone(),
        })
    }
}

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use super::DebugError;

/// What produced a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "action", rename_all = "snake_case")]
pub enum Step<A> {
    Action(A),
    /// A direct write through the store's update path or one of its cursors.
    Write,
}

/// A move through recorded history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Travel {
    /// To the entry at an index.
    To(usize),
    /// One entry back, down to the base model.
    Back,
    /// One entry forward.
    Forward,
}

/// One committed step and the model it produced.
pub struct Entry<A, M> {
    pub step: Step<A>,
    pub model: Arc<M>,
}

impl<A: Clone, M> Clone for Entry<A, M> {
    fn clone(&self) -> Self {
        Self {
            step: self.step.clone(),
            model: Arc::clone(&self.model),
        }
    }
}

impl<A: fmt::Debug, M: fmt::Debug> fmt::Debug for Entry<A, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("step", &self.step)
            .field("model", &self.model)
            .finish()
    }
}

/// Ordered record of committed steps with a cursor for time travel.
///
/// `position` is the entry the store currently shows; `None` means the base
/// model, i.e. the state before the first recorded entry. Recording a new
/// step while rewound discards every entry after `position`.
pub struct History<A, M> {
    base: Option<Arc<M>>,
    entries: VecDeque<Entry<A, M>>,
    position: Option<usize>,
    capacity: Option<usize>,
}

impl<A, M> History<A, M> {
    /// Empty history keeping at most `capacity` entries (unbounded if `None`).
    /// The newest entry is always kept, so a capacity of zero acts as one.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            base: None,
            entries: VecDeque::new(),
            position: None,
            capacity: capacity.map(|capacity| capacity.max(1)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn base(&self) -> Option<&Arc<M>> {
        self.base.as_ref()
    }

    pub fn get(&self, index: usize) -> Option<&Entry<A, M>> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry<A, M>> {
        self.entries.iter()
    }

    pub fn push(&mut self, entry: Entry<A, M>) {
        let keep = self.position.map_or(0, |position| position + 1);
        self.entries.truncate(keep);
        self.entries.push_back(entry);

        if let Some(capacity) = self.capacity {
            while self.entries.len() > capacity {
                if let Some(evicted) = self.entries.pop_front() {
                    self.base = Some(evicted.model);
                }
            }
        }
        self.position = Some(self.entries.len() - 1);
    }

    /// Where `travel` would land: the new position and its model. Does not
    /// move.
    pub fn resolve(&self, travel: Travel) -> Result<(Option<usize>, Arc<M>), DebugError> {
        let index = match travel {
            Travel::To(index) => index,
            Travel::Back => match self.position {
                None => return Err(DebugError::NothingToUndo),
                Some(0) => {
                    let base = self.base.clone().ok_or(DebugError::NothingToUndo)?;
                    return Ok((None, base));
                }
                Some(position) => position - 1,
            },
            Travel::Forward => {
                let next = self.position.map_or(0, |position| position + 1);
                if next >= self.entries.len() {
                    return Err(DebugError::NothingToRedo);
                }
                next
            }
        };
        let entry = self.entries.get(index).ok_or(DebugError::OutOfRange {
            index,
            len: self.entries.len(),
        })?;
        Ok((Some(index), Arc::clone(&entry.model)))
    }

    /// Move as described by `travel` and return the model now shown.
    pub fn travel(&mut self, travel: Travel) -> Result<Arc<M>, DebugError> {
        let (position, model) = self.resolve(travel)?;
        self.position = position;
        Ok(model)
    }

    /// Move to entry `index` and return its model.
    pub fn goto(&mut self, index: usize) -> Result<Arc<M>, DebugError> {
        self.travel(Travel::To(index))
    }

    /// Step one entry back, down to the base model.
    pub fn undo(&mut self) -> Result<Arc<M>, DebugError> {
        self.travel(Travel::Back)
    }

    /// Step one entry forward after an undo or rewind.
    pub fn redo(&mut self) -> Result<Arc<M>, DebugError> {
        self.travel(Travel::Forward)
    }

    /// Forget every entry and make `current` the new base.
    pub fn reset(&mut self, current: Arc<M>) {
        self.entries.clear();
        self.position = None;
        self.base = Some(current);
    }

    /// JSON snapshot of the history for external inspection tools.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value>
    where
        A: Serialize,
        M: Serialize,
    {
        let entries = self
            .entries
            .iter()
            .map(|entry| {
                Ok(json!({
                    "step": serde_json::to_value(&entry.step)?,
                    "model": serde_json::to_value(entry.model.as_ref())?,
                }))
            })
            .collect::<serde_json::Result<Vec<_>>>()?;
        let base = match &self.base {
            Some(model) => serde_json::to_value(model.as_ref())?,
            None => serde_json::Value::Null,
        };

        Ok(json!({
            "base": base,
            "position": self.position,
            "capacity": self.capacity,
            "entries": entries,
        }))
    }
}

impl<A, M> fmt::Debug for History<A, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("len", &self.entries.len())
            .field("position", &self.position)
            .field("capacity", &self.capacity)
            .finish()
    }
}

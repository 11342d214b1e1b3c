// Block-editor state and its mutation operations.
//
// Every operation takes the current `EditorState` by value and returns the
// next one. Successful mutations refresh `updated_at`, renumber positions to
// `0..n-1` and push an owned snapshot onto the bounded undo history. With no
// proposal loaded every mutator hands the state back untouched.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::types::{Block, BlockContent, Proposal, ProposalStatus};

/// Maximum number of snapshots kept for undo/redo.
pub const MAX_HISTORY: usize = 50;

// ── History ────────────────────────────────────────────────────────

/// Bounded list of full proposal snapshots plus a cursor.
///
/// `index < entries.len()` whenever the history is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: Vec<Proposal>,
    index: usize,
}

impl History {
    pub fn new(initial: Proposal) -> Self {
        Self { entries: vec![initial], index: 0 }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position, `None` when empty.
    pub fn index(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.index)
    }

    pub fn entries(&self) -> &[Proposal] {
        &self.entries
    }

    pub fn current(&self) -> Option<&Proposal> {
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Append a snapshot after the cursor, discarding any redo tail and
    /// evicting the oldest entry past [`MAX_HISTORY`].
    fn push(&mut self, snapshot: Proposal) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > MAX_HISTORY {
            let overflow = self.entries.len() - MAX_HISTORY;
            self.entries.drain(..overflow);
        }
        self.index = self.entries.len() - 1;
    }

    fn step_back(&mut self) -> Option<&Proposal> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.current()
    }

    fn step_forward(&mut self) -> Option<&Proposal> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.current()
    }
}

// ── Editor state ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub proposal: Option<Proposal>,
    pub selected_block_id: Option<String>,
    pub history: History,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        self.proposal.as_ref().map(|proposal| proposal.blocks.as_slice()).unwrap_or(&[])
    }

    pub fn selected_block(&self) -> Option<&Block> {
        let id = self.selected_block_id.as_deref()?;
        self.blocks().iter().find(|block| block.id == id)
    }
}

/// Apply `mutate` to the loaded proposal. A `false` return means nothing
/// changed: no timestamp refresh, no history entry.
fn commit(mut state: EditorState, mutate: impl FnOnce(&mut Proposal) -> bool) -> EditorState {
    let Some(proposal) = state.proposal.as_mut() else {
        debug!("no proposal loaded, ignoring mutation");
        return state;
    };
    if !mutate(proposal) {
        return state;
    }
    renumber(&mut proposal.blocks);
    proposal.updated_at = Utc::now();
    let snapshot = proposal.clone();
    state.history.push(snapshot);
    state
}

fn renumber(blocks: &mut [Block]) {
    for (position, block) in blocks.iter_mut().enumerate() {
        block.position = position;
    }
}

// ── Operations ─────────────────────────────────────────────────────

/// Install `proposal` as the active document with a fresh history.
pub fn load_proposal(_state: EditorState, mut proposal: Proposal) -> EditorState {
    proposal.blocks.sort_by_key(|block| block.position);
    renumber(&mut proposal.blocks);
    debug!(proposal_id = %proposal.id, blocks = proposal.blocks.len(), "loaded proposal");
    EditorState {
        history: History::new(proposal.clone()),
        proposal: Some(proposal),
        selected_block_id: None,
    }
}

/// Append a block with a fresh id at the end of the document.
pub fn add_block(state: EditorState, content: BlockContent) -> EditorState {
    commit(state, |proposal| {
        let position = proposal.blocks.len();
        proposal.blocks.push(Block::new(content, position));
        true
    })
}

/// Replace the content of block `id`. Unknown ids leave the state unchanged.
pub fn update_block(state: EditorState, id: &str, content: BlockContent) -> EditorState {
    commit(state, |proposal| match proposal.blocks.iter_mut().find(|block| block.id == id) {
        Some(block) => {
            block.content = content;
            true
        }
        None => false,
    })
}

pub fn delete_block(state: EditorState, id: &str) -> EditorState {
    let mut next = commit(state, |proposal| {
        let before = proposal.blocks.len();
        proposal.blocks.retain(|block| block.id != id);
        proposal.blocks.len() != before
    });
    if next.selected_block_id.as_deref() == Some(id) {
        next.selected_block_id = None;
    }
    next
}

/// Clone block `id` under a new id, directly after the original.
pub fn duplicate_block(state: EditorState, id: &str) -> EditorState {
    commit(state, |proposal| {
        let Some(index) = proposal.blocks.iter().position(|block| block.id == id) else {
            return false;
        };
        let mut copy = proposal.blocks[index].clone();
        copy.id = Uuid::new_v4().to_string();
        copy.position = proposal.blocks[index].position + 1;
        proposal.blocks.insert(index + 1, copy);
        true
    })
}

/// Adopt an externally reordered block list, e.g. a drag-and-drop result.
///
/// The list must hold exactly the document's current block ids; anything
/// else is ignored.
pub fn reorder_blocks(state: EditorState, ordered: Vec<Block>) -> EditorState {
    commit(state, |proposal| {
        let current: HashSet<&str> = proposal.blocks.iter().map(|block| block.id.as_str()).collect();
        let incoming: HashSet<&str> = ordered.iter().map(|block| block.id.as_str()).collect();
        if ordered.len() != proposal.blocks.len() || current != incoming {
            warn!(
                expected = proposal.blocks.len(),
                received = ordered.len(),
                "reorder list does not match document blocks"
            );
            return false;
        }
        proposal.blocks = ordered;
        true
    })
}

/// Change the selection only; selection is not part of undo history.
pub fn select_block(mut state: EditorState, id: Option<&str>) -> EditorState {
    if state.proposal.is_none() {
        return state;
    }
    state.selected_block_id = match id {
        Some(id) if state.blocks().iter().any(|block| block.id == id) => Some(id.to_string()),
        _ => None,
    };
    state
}

pub fn update_title(state: EditorState, title: impl Into<String>) -> EditorState {
    let title = title.into();
    commit(state, |proposal| {
        if proposal.title == title {
            return false;
        }
        proposal.title = title;
        true
    })
}

pub fn set_status(state: EditorState, status: ProposalStatus) -> EditorState {
    commit(state, |proposal| {
        if proposal.status == status {
            return false;
        }
        proposal.status = status;
        true
    })
}

pub fn undo(mut state: EditorState) -> EditorState {
    if state.proposal.is_none() {
        return state;
    }
    if let Some(snapshot) = state.history.step_back() {
        state.proposal = Some(snapshot.clone());
        clear_stale_selection(&mut state);
    }
    state
}

pub fn redo(mut state: EditorState) -> EditorState {
    if state.proposal.is_none() {
        return state;
    }
    if let Some(snapshot) = state.history.step_forward() {
        state.proposal = Some(snapshot.clone());
        clear_stale_selection(&mut state);
    }
    state
}

fn clear_stale_selection(state: &mut EditorState) {
    if state.selected_block().is_none() {
        state.selected_block_id = None;
    }
}

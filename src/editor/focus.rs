use crate::api::types::TextRange;

/// Block and character range receiving keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusState {
    pub block_id: String,
    pub range: TextRange,
}

impl FocusState {
    pub fn new(block_id: &str, range: TextRange) -> Self {
        Self {
            block_id: block_id.to_string(),
            range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusPhase<'a> {
    Idle,
    Focused(&'a FocusState),
    PendingApply(&'a FocusState),
}

/// Two-phase focus: `set` stages a value, `apply` publishes it.
///
/// Several `set` calls between two `apply` calls coalesce into the last one.
/// The controller never applies on its own; the render loop calls `apply`
/// once per input pass.
#[derive(Debug, Clone, Default)]
pub struct FocusController {
    applied: Option<FocusState>,
    pending: Option<FocusState>,
}

impl FocusController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, block_id: &str, range: TextRange) {
        self.pending = Some(FocusState::new(block_id, range));
    }

    /// Publishes the pending value, if any. `text_len` resolves a block's
    /// current text length: a block it cannot find drops the focus, a range
    /// past the end is clamped to it. Returns whether the observable focus changed.
    pub fn apply<F>(&mut self, text_len: F) -> bool
    where
        F: Fn(&str) -> Option<usize>,
    {
        let Some(mut next) = self.pending.take() else {
            return false;
        };
        let Some(len) = text_len(&next.block_id) else {
            tracing::warn!(block_id = %next.block_id, "pending focus names a missing block, clearing");
            let changed = self.applied.is_some();
            self.applied = None;
            return changed;
        };
        if !next.range.fits(len) {
            next.range = TextRange::new(next.range.from.min(len), next.range.to.min(len));
        }
        if self.applied.as_ref() == Some(&next) {
            return false;
        }
        self.applied = Some(next);
        true
    }

    /// Drops both the visible and the pending focus immediately.
    pub fn clear(&mut self) {
        self.applied = None;
        self.pending = None;
    }

    pub fn current(&self) -> Option<&FocusState> {
        self.applied.as_ref()
    }

    pub fn pending(&self) -> Option<&FocusState> {
        self.pending.as_ref()
    }

    pub fn phase(&self) -> FocusPhase<'_> {
        match (&self.pending, &self.applied) {
            (Some(p), _) => FocusPhase::PendingApply(p),
            (None, Some(a)) => FocusPhase::Focused(a),
            (None, None) => FocusPhase::Idle,
        }
    }

    /// Moves the visible caret without a pending round, for local text edits.
    pub(crate) fn replace_range(&mut self, range: TextRange) {
        if let Some(state) = self.applied.as_mut() {
            state.range = range;
        }
    }
}

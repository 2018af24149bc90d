//! Test assertions for pipe entity state.

use crate::model::{PipeEntity, PipeState};

/// Asserts a pipe's observed state equals `expected`.
pub fn assert_pipe_state(entity: &PipeEntity, expected: PipeState) {
    assert_eq!(
        entity.current_state, expected,
        "expected pipe {} to be {expected:?}, was {:?}",
        entity.name, entity.current_state
    );
}

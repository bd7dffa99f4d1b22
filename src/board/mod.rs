//! Kanban board controller for the application pipeline.
//!
//! The board keeps a disposable cache of application cards and turns drag
//! gestures into stage transitions:
//!
//! 1. [`KanbanBoard::drag_start`] records the dragged card.
//! 2. [`KanbanBoard::drag_end`] resolves the drop target with
//!    [`resolve_drop_target`]. A move into Disbursed is suspended until
//!    [`KanbanBoard::confirm_disbursement`] supplies an amount; any other
//!    move is applied to the cache immediately.
//! 3. The returned [`StageCommit`] is written by a [`StageCommitter`]
//!    without borrowing the board, so other cards stay interactive.
//! 4. [`KanbanBoard::settle`] reports the result. A failed write discards
//!    the cache and refetches it from the store.
//!
//! A card with a commit in flight cannot be dragged again until its commit
//! settles.

mod commit;
mod controller;
mod drop_target;

pub use commit::{CommitReport, StageCommit, StageCommitter};
pub use controller::{
    BoardSearch, DisbursementError, DragOutcome, KanbanBoard, MoveOutcome, PendingDisbursement,
    SettleOutcome,
};
pub use drop_target::{DropTarget, Resolution, resolve_drop_target};

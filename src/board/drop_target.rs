//! Priority-ordered resolution of drop targets to pipeline stages.

use crate::application::domain::{ApplicationCard, ApplicationId, Stage};

/// The element a card was dropped on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    id: String,
    sortable_container: Option<String>,
}

impl DropTarget {
    /// Creates a target from the dropped-on element's identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sortable_container: None,
        }
    }

    /// Records the sortable group the target element belongs to.
    #[must_use]
    pub fn in_container(mut self, container: impl Into<String>) -> Self {
        self.sortable_container = Some(container.into());
        self
    }

    /// Returns the target element identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the sortable group identifier, if any.
    #[must_use]
    pub fn sortable_container(&self) -> Option<&str> {
        self.sortable_container.as_deref()
    }
}

/// How a drop target was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Dropped on a stage column.
    Column(Stage),
    /// Dropped inside a stage's sortable card group.
    SortableGroup(Stage),
    /// Dropped directly on another card; its current stage is the target.
    Card(Stage),
}

impl Resolution {
    /// Returns the resolved target stage.
    #[must_use]
    pub const fn stage(self) -> Stage {
        match self {
            Self::Column(stage) | Self::SortableGroup(stage) | Self::Card(stage) => stage,
        }
    }
}

/// Resolves a drop target to a stage.
///
/// Checked in order: a stage column identifier, then the sortable group
/// owning the target (or the target itself being a group), then a cached
/// card with the target's identifier. Returns `None` when nothing matches;
/// the gesture should then be discarded.
#[must_use]
pub fn resolve_drop_target(target: &DropTarget, cards: &[ApplicationCard]) -> Option<Resolution> {
    if let Some(stage) = Stage::from_column_id(target.id()) {
        return Some(Resolution::Column(stage));
    }

    let group = target.sortable_container().unwrap_or_else(|| target.id());
    if let Some(stage) = stage_for_group(group) {
        return Some(Resolution::SortableGroup(stage));
    }

    let card_id = ApplicationId::parse(target.id())?;
    cards
        .iter()
        .find(|card| card.application.id() == card_id)
        .map(|card| Resolution::Card(card.application.stage()))
}

fn stage_for_group(group: &str) -> Option<Stage> {
    Stage::ALL
        .into_iter()
        .find(|stage| stage.sortable_group_id() == group)
}

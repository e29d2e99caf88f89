//! Common behaviour of entity records.

use crate::task::domain::{EntityId, EntityRef, EntityType};
use serde::Serialize;
use std::fmt::Debug;

/// Business record that can own a checklist.
///
/// Records serialize into the context used to render display titles and
/// links, so every field is available to templates by name.
pub trait EntityRecord: Debug + Clone + Serialize + Send + Sync + 'static {
    /// Entity type tag of this record kind.
    const ENTITY_TYPE: EntityType;

    /// Returns the record identifier.
    fn id(&self) -> &EntityId;

    /// Returns the record status in its own vocabulary.
    fn status_label(&self) -> &'static str;

    /// Returns whether the record accepts no further work.
    fn is_terminal(&self) -> bool;

    /// Returns the polymorphic reference used by tasks.
    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(Self::ENTITY_TYPE, self.id().clone())
    }
}

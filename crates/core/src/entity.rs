//! Entities: things with identity inside an aggregate, such as a bill's line
//! items. Two line items with equal fields but different ids are different
//! rows.

pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

pub mod q_table;

use std::fmt::Debug;

/// A trait for state and action types that can be used as keys in a [`HashMap`](std::collections::HashMap)
pub trait Hashable: Copy + Eq + std::hash::Hash {}

impl<T> Hashable for T where T: Copy + Eq + std::hash::Hash {}

/// A [`Hashable`] type with a total order, so table contents can be listed deterministically
pub trait TableKey: Hashable + Ord + Debug {}

impl<T> TableKey for T where T: Hashable + Ord + Debug {}

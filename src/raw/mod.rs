mod balance;
mod index;
mod node;
mod policy;
mod query;
mod store;
mod tree;
mod validate;

pub(crate) use index::Index;
pub(crate) use node::Dir;
pub(crate) use policy::{Compact, FreeList};
pub(crate) use query::Span;
pub(crate) use store::Store;
pub(crate) use tree::RawTree;

pub use store::Growth;
pub use validate::Violation;

//! Primitives layer
//!
//! Primitives are stateless facades over a [`Database`](crate::Database):
//! they hold an `Arc<Database>` and delegate every read and write to its
//! record store. Cloning a primitive is cheap and clones share all state.
//!
//! - **VectorStore**: vector collections with exact similarity search

pub mod vector;

pub use vector::VectorStore;

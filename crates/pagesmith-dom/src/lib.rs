//! Pagesmith DOM - permissive HTML tree
//!
//! A small, forgiving HTML representation used by the patch engine:
//! - Tokenizer over the raw byte stream
//! - Tree builder with open-element recovery
//! - Serializer back to text
//! - Element location by literal id and by structural selector
//!
//! The tree is deliberately lossless about what it does not understand:
//! entities are never decoded, attribute values are kept verbatim, and
//! unknown markup degrades to text rather than failing the parse. A
//! document parsed here is exclusively owned by one caller from parse to
//! serialize; there is no shared state.

#![warn(unreachable_pub)]

pub mod builder;
pub mod node;
pub mod select;
pub mod serialize;
pub mod tokenizer;

pub use builder::{parse_document, parse_fragment};
pub use node::Node;
pub use select::{find_by_id, find_by_selector, NodePath, Selector, SelectorError};
pub use serialize::serialize;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

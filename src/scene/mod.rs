//! Target scene module
//!
//! The minimal host the action core runs against:
//! - [`Node`]: a target with the tweenable properties leaf actions mutate
//! - [`Scene`]: the node pool, addressed by non-owning [`NodeHandle`] keys
//!
//! Actions never own their targets. They hold a [`NodeHandle`] back-reference
//! and resolve it through the [`Scene`] on every step; a handle whose node has
//! been removed simply stops having any visible effect.

pub mod node;
pub mod scene;

pub use node::{Color, Node, SpriteState};
pub use scene::Scene;

use slotmap::new_key_type;

new_key_type! {
    /// Non-owning handle to a [`Node`] in a [`Scene`].
    pub struct NodeHandle;
}

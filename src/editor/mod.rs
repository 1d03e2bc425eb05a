//! Headless core of the pipeline editor.
//!
//! [`GraphModel`] owns nodes and links, [`LayoutEngine`] relaxes their
//! positions, [`InteractionController`] arbitrates drag against pan/zoom
//! and [`Scene`] keeps the drawn visual set keyed to the graph.
//! [`EditorSession`] wires them together; nothing here touches the DOM.

pub mod error;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod session;
pub mod sync;
pub mod taxonomy;
pub mod types;

pub use error::{GraphError, GraphResult};
pub use interaction::{InteractionController, ModeKind, ViewTransform};
pub use layout::{LayoutEngine, LayoutParameters, TickOutcome};
pub use model::GraphModel;
pub use session::{EditorSession, GraphSnapshot};
pub use sync::{KeyedDiff, Scene, keyed_diff, wrap_words};
pub use types::{Link, LinkKey, Node, NodeId, NodeOption};

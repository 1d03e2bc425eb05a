mod component;
mod controls;
mod handle;
mod render;

pub use component::PipelineCanvas;
pub use controls::EditorControls;
pub use handle::EditorHandle;

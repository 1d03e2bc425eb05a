pub mod pipeline_editor;

pub mod canvas;
pub mod jira;
pub mod validator;

pub use canvas::CanvasExporter;
pub use jira::{JiraExport, JiraExporter, StructureCheck};
pub use validator::validate_structure;

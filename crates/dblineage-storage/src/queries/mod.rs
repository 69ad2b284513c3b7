//! Query modules, one per table family.

pub mod components;
pub mod lineage_reports;
pub mod lineage_results;
pub mod projects;
pub mod schema;
pub mod source_files;
pub mod system_control;
pub mod table_flows;
pub mod usages;
pub mod util;

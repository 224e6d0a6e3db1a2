pub mod extraction;
pub mod processor; // text -> analysis / classified report

pub use processor::ReportProcessor;

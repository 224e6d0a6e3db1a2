pub mod assessment;
pub mod enums;
pub mod lab;
pub mod report;

pub use assessment::*;
pub use lab::*;
pub use report::*;

pub mod chart;
pub mod macros;
pub mod project;
pub mod stats;
pub mod template;
pub mod variable;

pub use chart::*;
pub use project::*;
pub use stats::*;
pub use template::*;
pub use variable::*;

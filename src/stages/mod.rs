pub mod analysis;
pub mod format;
pub mod payment;
pub mod pipeline;

pub use analysis::*;
pub use format::*;
pub use payment::*;
pub use pipeline::*;

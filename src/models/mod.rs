pub mod analysis;
pub mod payment;
pub mod transcript;

pub use analysis::*;
pub use payment::*;
pub use transcript::*;

pub mod client;
pub mod prompts;
pub mod tools;
pub mod validation;

pub use client::*;
pub use prompts::*;
pub use tools::*;
pub use validation::*;

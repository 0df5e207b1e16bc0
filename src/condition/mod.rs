pub mod artifact;
pub mod compiled;
pub mod definition;
pub mod operator;

pub use compiled::*;
pub use definition::*;
pub use operator::*;

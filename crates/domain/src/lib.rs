pub mod errors;
pub mod title;
pub mod todo;

pub use errors::*;
pub use title::*;
pub use todo::*;

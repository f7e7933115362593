pub mod direction;
pub mod error;
pub mod parse;
pub mod ratio;
pub mod session;
pub mod stability;

pub use direction::AutoResolver;
pub use error::Unavailable;
pub use ratio::{expected_pair, recompute};
pub use session::Session;
pub use stability::Stabilizer;

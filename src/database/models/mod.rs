pub mod activation_code;
pub mod subscriber;

pub use activation_code::*;
pub use subscriber::*;

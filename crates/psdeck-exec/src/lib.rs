pub mod catalog;
pub mod contracts;
pub mod dispatch;
pub mod error;
pub mod service;

pub use catalog::*;
pub use contracts::*;
pub use dispatch::*;
pub use error::*;
pub use service::*;

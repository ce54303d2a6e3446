pub mod actions;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod history;
pub mod outcome;
pub mod params;
pub mod reducer;
pub mod state;

pub use actions::*;
pub use catalog::*;
pub use coordinator::*;
pub use history::*;
pub use outcome::*;
pub use params::*;
pub use reducer::*;
pub use state::*;

pub use config::*;

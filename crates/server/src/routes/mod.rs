mod health;
mod poems;

pub use health::*;
pub use poems::*;

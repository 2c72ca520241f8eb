pub mod activity;
pub mod appointment;
pub mod enums;
pub mod time;

pub use activity::*;
pub use appointment::*;
pub use enums::*;
pub use time::*;

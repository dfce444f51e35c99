//! Domain models for the recycling rewards program

mod material;
mod membership;
mod submission;
mod subscription;
mod wtn;

pub use material::*;
pub use membership::*;
pub use submission::*;
pub use subscription::*;
pub use wtn::*;

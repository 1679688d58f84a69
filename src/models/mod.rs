mod media;
mod user;

pub use media::*;
pub use user::*;

pub mod candidate;
pub mod location;
pub mod time;
pub mod zone;

pub use candidate::*;
pub use location::*;
pub use time::*;
pub use zone::*;

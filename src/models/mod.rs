pub mod response;
pub mod result;
pub mod upload;

pub use response::*;
pub use result::*;
pub use upload::*;

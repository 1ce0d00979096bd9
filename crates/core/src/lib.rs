pub mod describe;
pub mod models;
pub mod session;
pub mod traits;

pub use describe::*;
pub use models::*;
pub use session::*;
pub use traits::*;

pub mod category;
pub mod order;
pub mod service;
pub mod user;

pub use category::*;
pub use order::*;
pub use service::*;
pub use user::*;

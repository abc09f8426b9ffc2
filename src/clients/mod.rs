//! Collection clients: cached listings plus mutations that invalidate the
//! collection and notify the operator.

#[macro_use]
pub mod macros;
pub mod category_client;
pub mod order_client;
pub mod service_client;
pub mod user_client;

pub use category_client::*;
pub use order_client::*;
pub use service_client::*;
pub use user_client::*;

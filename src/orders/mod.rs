//! Order status vocabulary and read-side order views.

mod models;
mod status;

pub use models::{OrderDetail, OrderItemView};
pub use status::{OrderPhase, OrderStatus, UnknownStatusCode};

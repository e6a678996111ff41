//! Checkout.
//!
//! [`CheckoutOrchestrator`] validates preconditions, submits the order
//! payload (identities and quantities only, never prices) and branches
//! into the cash-on-delivery or online-payment path. The gateways are
//! trait seams so the orchestration is testable without a server.

mod errors;
mod gateways;
mod models;
mod orchestrator;

pub use errors::CheckoutError;
pub use gateways::{
    ApiOrdersGateway, ApiPaymentsGateway, MockOrdersGateway, MockPaymentsGateway, OrdersGateway,
    PaymentsGateway,
};
pub use models::{
    CheckoutRequest, CreatedOrder, DeliveryAddress, OrderDraft, OrderDraftItem, PaymentMethod,
    PaymentRedirect, UnknownPaymentCode,
};
pub use orchestrator::{CheckoutOrchestrator, CheckoutOutcome};

//! Morsel prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    auth::{AuthError, SessionManager, UserProfile},
    cart::{Cart, CartEngine, CartError, CartLineItem, OptionChoice, OptionSelection},
    checkout::{
        ApiOrdersGateway, ApiPaymentsGateway, CheckoutError, CheckoutOrchestrator,
        CheckoutOutcome, CheckoutRequest, CreatedOrder, DeliveryAddress, OrderDraft,
        OrdersGateway, PaymentMethod, PaymentRedirect, PaymentsGateway,
    },
    config::ClientConfig,
    http::{ApiClient, ApiError, ApiRequest, ApiResponse, HttpTransport, ReqwestTransport},
    orders::{OrderDetail, OrderItemView, OrderPhase, OrderStatus},
    storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError},
};

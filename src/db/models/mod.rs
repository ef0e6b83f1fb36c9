//! Database models
//!
//! Entity structs stored in SurrealDB plus the request/response DTOs the
//! API layer derives from them.

pub mod account;
pub mod flag;
pub mod notification;
pub mod order;
pub mod product;

pub use account::{Account, AccountCreate, AccountUpdate, AccountView, Role};
pub use flag::{Flag, FlagCreateRequest, FlagStatus, FlagStatusRequest, FlagType, FlagView, ReporterInfo};
pub use notification::{Notification, NotificationView};
pub use order::{
    Order, OrderCreateRequest, OrderLine, OrderLineRequest, OrderLineView, OrderStatus,
    OrderStatusRequest, OrderView, Requester, TransitionError, authorize_transition,
};
pub use product::{Category, Product, ProductCreate, ProductUpdate, ProductView, SellerSummary};

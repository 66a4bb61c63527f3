pub mod cart;
pub mod checkout;
pub mod lifecycle;
pub mod menu_repository;
pub mod order_repository;

pub use cart::Cart;
pub use checkout::CheckoutService;
pub use lifecycle::DataLifecycle;
pub use menu_repository::MenuRepository;
pub use order_repository::OrderRepository;

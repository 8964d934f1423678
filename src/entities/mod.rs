pub mod integration_credential;
pub mod order;
pub mod order_line;
pub mod product;
pub mod purchase_order;
pub mod purchase_order_line;

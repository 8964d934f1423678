pub mod credentials;
pub mod csv_import;
pub mod purchase_orders;
pub mod retention;
pub mod risk;

//! Domain models for the storefront.

pub mod abandoned_cart;
pub mod product;

pub use abandoned_cart::{AbandonedCart, AbandonedCartItem, NewAbandonedCart};
pub use product::Product;

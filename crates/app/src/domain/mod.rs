//! Bookstore Domain Concerns

pub mod books;
pub mod carts;
pub mod coupons;
pub mod orders;
pub mod users;

pub mod account;
pub mod allocator;
pub mod lot;
pub mod reservation;

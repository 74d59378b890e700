pub mod pricing;
pub mod rent_roll;

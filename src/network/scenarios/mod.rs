pub mod factory;
pub mod printer;
pub mod synthetic;

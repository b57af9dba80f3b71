pub mod budget;
pub mod despesa;
pub mod forecast;

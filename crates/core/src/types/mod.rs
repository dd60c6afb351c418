pub mod credentials;
pub mod sort;
pub mod visitor;

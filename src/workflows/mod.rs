pub mod contacts;
pub mod defendant;
pub mod plea;
pub mod scanning;
pub mod validation;

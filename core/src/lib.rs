pub mod registry;
pub mod wake;

pub mod properties;
pub mod schemas;
pub mod wizard;

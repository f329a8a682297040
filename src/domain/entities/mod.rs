pub mod dataset;
pub mod invoice;
pub mod layout;

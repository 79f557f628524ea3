//! Small helpers shared by the domain models.

pub mod serde;

pub mod campaign;
pub mod claims;
pub mod geo;
pub mod import;
pub mod insights;
pub mod route;
pub mod stats;
pub mod status;
pub mod team;

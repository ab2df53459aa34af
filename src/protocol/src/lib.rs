pub mod error;
pub mod rd_model;
pub mod sv_model;

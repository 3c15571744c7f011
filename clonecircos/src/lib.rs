pub mod band;
pub mod config;
pub mod error;
pub mod hue;
pub mod karyotype;
pub mod link;
pub mod link_log;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod table;
mod tsv;

#[doc(hidden)]
pub mod _internal_test_data;

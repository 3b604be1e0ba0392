//! Batch choropleth map generator for municipal vaccination coverage:
//! loads a delimited-text dataset with a WKT geometry column, classifies
//! each vaccine's coverage into fixed bands, and renders one PNG map per
//! vaccine with a legend.

pub mod batch;
pub mod classify;
pub mod config;
pub mod data;
pub mod export;
pub mod layout;
pub mod render;
pub mod types;

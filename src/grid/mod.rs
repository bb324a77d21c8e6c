// src/grid/mod.rs
//
// Everything the report grid needs on the client side: the cell value
// codec, the report column set, filter/sort serialization, and the
// datasource adapter that feeds viewport row ranges from the API.

pub mod codec;
pub mod columns;
pub mod datasource;
pub mod filter;

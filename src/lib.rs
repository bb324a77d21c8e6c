pub mod cache;
pub mod client;
pub mod grid;
pub mod model;
pub mod params;
pub mod stats;
pub mod typeahead;

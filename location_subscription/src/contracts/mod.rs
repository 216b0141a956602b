pub mod filter_affected_locations;

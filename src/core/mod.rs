pub mod chain_map;
pub mod record;

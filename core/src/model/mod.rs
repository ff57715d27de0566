pub mod attendance;
pub mod bucket;
pub mod record;
pub mod staff;
pub mod stats;
pub mod trunk;

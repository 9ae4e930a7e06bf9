pub mod record;
pub mod sector;

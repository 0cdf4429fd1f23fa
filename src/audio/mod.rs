// Audio module - click generation and the CPAL output stream

pub mod click;
pub mod engine;
pub mod sink;
pub mod status;

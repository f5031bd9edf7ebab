pub mod inbox;
pub mod storage;
pub mod submit;
pub mod types;

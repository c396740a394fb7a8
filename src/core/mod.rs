pub mod audio;
pub mod transcript;
pub mod video;
pub mod vision;

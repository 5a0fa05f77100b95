pub mod log;
pub mod playback;
pub mod settings;
pub mod sounds;
pub mod timer;

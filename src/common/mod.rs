pub mod cancel;
pub mod net;
pub mod time;

pub mod daily;

pub use daily::VideoClient;

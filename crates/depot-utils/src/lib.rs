pub mod error;
pub mod fs;
pub mod lock;
pub mod path;
pub mod time;
pub mod uri;

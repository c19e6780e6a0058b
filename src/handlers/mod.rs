//! Handler implementations

pub mod console;
pub mod fanout;
pub mod level;
pub mod memory;
pub mod writer;

pub use console::ConsoleHandler;
pub use fanout::Fanout;
pub use level::LevelHandler;
pub use memory::MemoryHandler;
pub use writer::WriterHandler;

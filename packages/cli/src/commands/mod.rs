pub mod export;
pub mod init;
pub mod run;

pub use export::{export, ExportArgs};
pub use init::{init, InitArgs};
pub use run::{run, RunArgs};

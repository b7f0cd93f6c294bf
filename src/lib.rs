pub mod archive;
pub mod artifact;
pub mod assembler;
pub mod cmd;
pub mod context;
pub mod error;
pub mod layout;
pub mod packer;
pub mod result;
pub mod selector;
pub mod staging;
pub mod tpl;
pub mod utils;
pub mod verify;

pub use error::Error;
pub use result::Result;

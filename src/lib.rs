pub mod cgi;
pub mod cli;
pub mod config;
pub mod model;
pub mod oracle;
pub mod resolve;
pub mod roots;
pub mod router;
pub mod translate;
pub mod util;

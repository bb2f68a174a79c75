//! Rendering of OpenVPN configuration options

pub mod option_file;


use std::io;


/// An OpenVPN option which can be passed either on the command line
/// or inside a configuration file
pub trait ConfigOption {
    fn name(&self) -> &str;

    /// Render the option as command line arguments
    fn to_cli(&self) -> io::Result<Vec<String>>;

    /// Render the option as a configuration file entry
    fn to_file(&self) -> String;
}

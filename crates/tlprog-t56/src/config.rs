//! T56 session configuration

use tlprog_core::error::{Error, Result};
use tlprog_core::programmer::Icsp;

/// Configuration options for a T56 session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct T56Config {
    /// In-circuit programming mode
    pub icsp: Icsp,
    /// Voltage option handed to the algorithm source
    pub voltage_option: u8,
}

/// Parse options from key=value pairs
///
/// Recognized keys: `icsp=off|vcc|novcc` and `vopt=<n>`.
pub fn parse_options(options: &[(&str, &str)]) -> Result<T56Config> {
    let mut config = T56Config::default();

    for (key, value) in options {
        match *key {
            "icsp" => match value.to_lowercase().as_str() {
                "off" | "0" => config.icsp = Icsp::Off,
                "vcc" | "on" => config.icsp = Icsp::WithVcc,
                "novcc" => config.icsp = Icsp::WithoutVcc,
                _ => {
                    return Err(Error::InvalidParameter(format!("icsp: {}", value)));
                }
            },
            "vopt" => {
                config.voltage_option = value
                    .parse()
                    .map_err(|_| Error::InvalidParameter(format!("vopt: {}", value)))?;
            }
            _ => {
                return Err(Error::InvalidParameter(format!("unknown option: {}", key)));
            }
        }
    }

    Ok(config)
}

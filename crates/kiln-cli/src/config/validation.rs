use crate::config::KilnConfig;
use crate::error::{ConfigError, Result};
use std::net::{IpAddr, Ipv4Addr};

impl KilnConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.port_start > self.port_end {
            return Err(ConfigError::InvalidValue {
                field: "portStart".to_string(),
                value: self.port_start.to_string(),
                hint: format!("portStart must not exceed portEnd ({})", self.port_end),
            }
            .into());
        }

        if self.port_start == 0 {
            return Err(ConfigError::InvalidValue {
                field: "portStart".to_string(),
                value: "0".to_string(),
                hint: "Use a port between 1 and 65535".to_string(),
            }
            .into());
        }

        if !self.root.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "root".to_string(),
                value: self.root.display().to_string(),
                hint: "Point root at the directory your build writes to".to_string(),
            }
            .into());
        }

        self.host_addr()?;
        Ok(())
    }

    /// Listen address. `localhost` maps to the IPv4 loopback.
    pub fn host_addr(&self) -> Result<IpAddr> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
        }
        self.host.parse().map_err(|_| {
            ConfigError::InvalidValue {
                field: "host".to_string(),
                value: self.host.clone(),
                hint: "Use an IP address such as 127.0.0.1 or 0.0.0.0".to_string(),
            }
            .into()
        })
    }
}

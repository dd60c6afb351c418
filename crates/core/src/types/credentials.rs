use std::fmt;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
    pub path: String,
}

/// Parsed form of `indexName;host,port,path;host,port,path;...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    raw: String,
    index_name: String,
    servers: Vec<ServerAddress>,
}

impl Credentials {
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let mut segments = input
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty());
        let index_name = segments
            .next()
            .ok_or_else(|| CoreError::InvalidCredentials("empty credential string".to_string()))?
            .to_string();
        let servers = segments
            .map(ServerAddress::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if servers.is_empty() {
            return Err(CoreError::InvalidCredentials(format!(
                "no servers configured for index {index_name}"
            )));
        }
        Ok(Self {
            raw: input.to_string(),
            index_name,
            servers,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn servers(&self) -> &[ServerAddress] {
        &self.servers
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl TryFrom<&str> for Credentials {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl ServerAddress {
    fn parse(segment: &str) -> Result<Self, CoreError> {
        let mut parts = segment.split(',').map(str::trim);
        let host = parts.next().unwrap_or_default();
        if host.is_empty() {
            return Err(CoreError::InvalidServer(segment.to_string()));
        }
        let port = parts
            .next()
            .filter(|port| !port.is_empty())
            .ok_or_else(|| CoreError::InvalidPort(segment.to_string()))?
            .parse()
            .map_err(|_| CoreError::InvalidPort(segment.to_string()))?;
        let path = parts.next().unwrap_or_default().trim_matches('/').to_string();
        if parts.next().is_some() {
            return Err(CoreError::InvalidServer(segment.to_string()));
        }
        Ok(Self {
            host: host.to_string(),
            port,
            path,
        })
    }
}

use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound of [`ServerDescriptor::load_ratio`]
pub const MAX_LOAD_RATIO: u8 = 100;

/// One entry of the server listing returned by the auth endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDescriptor {
    /// Server index, unique within a listing
    pub index: u16,
    /// Display name
    pub name: String,
    pub host: String,
    pub port: u16,
    /// User load in percent, capped at [`MAX_LOAD_RATIO`]
    #[serde(deserialize_with = "deserialize_load_ratio")]
    load_ratio: u8,
}

fn deserialize_load_ratio<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(u8::deserialize(deserializer)?.min(MAX_LOAD_RATIO))
}

impl ServerDescriptor {
    pub fn new(
        index: u16,
        name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        load_ratio: u8,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            host: host.into(),
            port,
            load_ratio: load_ratio.min(MAX_LOAD_RATIO),
        }
    }

    pub fn load_ratio(&self) -> u8 {
        self.load_ratio
    }

    /// Single line used when dumping a listing for the operator
    pub fn diagnostic_line(&self) -> String {
        format!(
            "{}: {:>20} at {:>16}:{} {}% user ratio",
            self.index, self.name, self.host, self.port, self.load_ratio
        )
    }
}

/// First descriptor in `servers` carrying `index`.
///
/// Later duplicates are ignored.
pub fn find_server(servers: &[ServerDescriptor], index: u16) -> Option<&ServerDescriptor> {
    servers.iter().find(|server| server.index == index)
}

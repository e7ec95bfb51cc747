use crate::error::Error;
use std::io;

/// Configuration store, backed by a TOML table
///
/// Keys may contain dots to access nested tables (e.g `output.format`).
pub struct Config {
    value: toml::Value,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            value: toml::Value::Table(toml::map::Map::new()),
        }
    }
}

impl Config {
    fn lookup(&self, k: &str) -> Option<&toml::Value> {
        let mut item = &self.value;
        for key in k.split('.') {
            item = item.get(key)?;
        }
        Some(item)
    }

    /// Get an entry by path. If the input argument contains dots, the path is split
    /// into keys, each key being requested recursively.
    pub fn get<T: AsRef<str>>(&self, k: T) -> Option<&str> {
        self.lookup(k.as_ref())?.as_str()
    }

    /// Get an entry of type integer by path
    pub fn get_usize<T: AsRef<str>>(&self, k: T) -> Option<usize> {
        self.lookup(k.as_ref())?
            .as_integer()
            .and_then(|i| usize::try_from(i).ok())
    }

    /// Get an entry of type boolean by path
    pub fn get_bool<T: AsRef<str>>(&self, k: T) -> Option<bool> {
        self.lookup(k.as_ref())?.as_bool()
    }

    /// Set an entry at top level, overwriting any previous value
    pub fn set<T: Into<toml::Value>>(&mut self, k: &str, v: T) -> Option<toml::Value> {
        self.value
            .as_table_mut()
            .and_then(|t| t.insert(k.to_owned(), v.into()))
    }

    /// Load configuration from input object. Previous content is replaced.
    pub fn load_config<R: io::Read>(&mut self, mut config: R) -> Result<(), Error> {
        let mut s = String::new();
        config.read_to_string(&mut s)?;
        let table: toml::Table = toml::from_str(&s).map_err(|e| Error::Config(e.to_string()))?;
        self.value = toml::Value::Table(table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    const SAMPLE: &str = r#"
skip_index = 2
strict = true
output_format = "json"

[stats]
enabled = false
"#;

    #[test]
    fn config_load_and_get() {
        let mut config = Config::default();
        config.load_config(SAMPLE.as_bytes()).expect("valid TOML");
        assert_eq!(config.get_usize("skip_index"), Some(2));
        assert_eq!(config.get_bool("strict"), Some(true));
        assert_eq!(config.get("output_format"), Some("json"));
        assert_eq!(config.get_bool("stats.enabled"), Some(false));
        assert_eq!(config.get("stats.missing"), None);
        assert_eq!(config.get("skip_index"), None);
    }

    #[test]
    fn config_set_overrides() {
        let mut config = Config::default();
        config.load_config(SAMPLE.as_bytes()).expect("valid TOML");
        config.set("skip_index", 7);
        config.set("max_packets", -1);
        assert_eq!(config.get_usize("skip_index"), Some(7));
        assert_eq!(config.get_usize("max_packets"), None);
    }

    #[test]
    fn config_invalid() {
        let mut config = Config::default();
        assert!(config.load_config("skip_index = ".as_bytes()).is_err());
    }
}

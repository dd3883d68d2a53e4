pub mod server;

use std::path::PathBuf;
use std::{env, fs, io};

use anyhow::{Context, Result};
use clap::Args;
use log::warn;
use serde::de::DeserializeOwned;

use crate::dirs;

/// Command line flags shared by everything that loads a config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// The config directory, default is `~/.config/trivoxel`.
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// The data directory, default is `~/.local/share/trivoxel`.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn load<T>(&self, name: &str) -> Result<T>
    where
        T: CommonConfig + DeserializeOwned + Default,
    {
        let ps = PathSet::new(self.config_dir.clone(), self.data_dir.clone())?;
        ps.load_config(name)
    }
}

pub struct PathSet {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl PathSet {
    pub fn new(config_dir: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config_dir = match config_dir {
            Some(dir) => dir,
            None => match env::var("TRIVOXEL_CONFIG") {
                Ok(dir) => PathBuf::from(dir),
                Err(_) => dirs::config_dir()?,
            },
        };

        let data_dir = match data_dir {
            Some(dir) => dir,
            None => match env::var("TRIVOXEL_DATA") {
                Ok(dir) => PathBuf::from(dir),
                Err(_) => dirs::data_dir()?,
            },
        };

        dirs::ensure_dir_exists(&config_dir)
            .with_context(|| format!("ensure config directory: {}", config_dir.display()))?;
        dirs::ensure_dir_exists(&data_dir)
            .with_context(|| format!("ensure data directory: {}", data_dir.display()))?;

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    pub fn load_config<T>(&self, name: &str) -> Result<T>
    where
        T: CommonConfig + DeserializeOwned + Default,
    {
        let path = self.config_dir.join(format!("{name}.toml"));
        let mut cfg: T = match fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s).context("parse config toml")?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("Config file for {name} not found, using defaults");
                T::default()
            }
            Err(err) => {
                return Err(err).context(format!("read config file: {}", path.display()));
            }
        };

        cfg.complete(self).context("validate config")?;
        Ok(cfg)
    }
}

pub trait CommonConfig {
    fn complete(&mut self, ps: &PathSet) -> Result<()>;
}

/// See: [`shellexpand::full`].
pub fn expandenv(name: &str, s: impl AsRef<str>) -> Result<String> {
    let s =
        shellexpand::full(s.as_ref()).with_context(|| format!("expand env value for '{name}'"))?;
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Default)]
    struct TestConfig {
        #[serde(default)]
        name: String,

        #[serde(skip)]
        completed: bool,
    }

    impl CommonConfig for TestConfig {
        fn complete(&mut self, _ps: &PathSet) -> Result<()> {
            self.name = expandenv("name", &self.name)?;
            self.completed = true;
            Ok(())
        }
    }

    #[test]
    fn test_load_config() {
        let base = PathBuf::from("_test_trivoxel_config");
        let ps = PathSet::new(Some(base.join("config")), Some(base.join("data"))).unwrap();

        let cfg: TestConfig = ps.load_config("missing").unwrap();
        assert!(cfg.completed);
        assert_eq!(cfg.name, "");

        env::set_var("TRIVOXEL_TEST_NAME", "voxel");
        fs::write(
            ps.config_dir.join("present.toml"),
            "name = \"$TRIVOXEL_TEST_NAME\"\n",
        )
        .unwrap();
        let cfg: TestConfig = ps.load_config("present").unwrap();
        assert!(cfg.completed);
        assert_eq!(cfg.name, "voxel");

        fs::write(ps.config_dir.join("broken.toml"), "name = [").unwrap();
        assert!(ps.load_config::<TestConfig>("broken").is_err());

        fs::remove_dir_all(base).unwrap();
    }
}

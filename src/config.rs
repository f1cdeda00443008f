use anyhow::Result;
use serde::Deserialize;

// 配置文件结构
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_gz_file")]
    pub gz_file: String,
    #[serde(default = "default_xml_file")]
    pub xml_file: String,
    // 构建成功后是否保留 .gz 和 .xml 中间文件
    #[serde(default)]
    pub keep_files: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_file")]
    pub db_file: String,
    // 每处理多少个词条提交一次事务
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_url() -> String {
    "http://ftp.edrdg.org/pub/Nihongo/JMdict.gz".to_string()
}

fn default_gz_file() -> String {
    "JMdict.gz".to_string()
}

fn default_xml_file() -> String {
    "JMdict.xml".to_string()
}

fn default_db_file() -> String {
    "jmdict.db".to_string()
}

fn default_batch_size() -> usize {
    50_000
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            url: default_url(),
            gz_file: default_gz_file(),
            xml_file: default_xml_file(),
            keep_files: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            db_file: default_db_file(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: SourceConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    // 读取 config.toml，文件不存在时使用默认配置
    pub fn load() -> Result<Config> {
        Self::load_from(std::path::Path::new("config.toml"))
    }

    pub fn load_from(path: &std::path::Path) -> Result<Config> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: Config = toml::from_str(&content)
                    .map_err(|e| anyhow::anyhow!("配置文件解析失败: {}", e))?;
                Ok(config)
            }
            // 只有文件不存在才回退默认配置，其他读取错误照常上报
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(anyhow::anyhow!("配置文件 {} 无法读取: {}", path.display(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = Config::default();
        assert_eq!(config.database.batch_size, 50_000);
        assert!(config.source.url.ends_with("JMdict.gz"));
        assert!(!config.source.keep_files);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str("[database]\nbatch_size = 2\n").unwrap();
        assert_eq!(config.database.batch_size, 2);
        assert_eq!(config.database.db_file, "jmdict.db");
        assert_eq!(config.source.xml_file, "JMdict.xml");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.database.batch_size, 50_000);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        // 路径存在但读不出来（是个目录），不能静默回退默认配置
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(dir.path()).is_err());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "][ not toml").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}

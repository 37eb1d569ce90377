//! Configuration file loading with environment variable overrides.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ThumbnailError;
use crate::location::Destination;

/// Top-level configuration file contents.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Access key pair shared by both stores.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Store holding the original images.
    #[serde(default)]
    pub original: StoreConfig,

    /// Store thumbnails are written to.
    #[serde(default)]
    pub thumbnail: StoreConfig,
}

/// Access key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsConfig {
    /// AWS access key id.
    pub access_key_id: Option<String>,
    /// AWS secret access key.
    pub secret_access_key: Option<String>,
}

/// Location of one object store.
#[derive(Debug, Default, Deserialize)]
pub struct StoreConfig {
    /// AWS region.
    pub region: Option<String>,
    /// Bucket name.
    pub bucket: Option<String>,
    /// S3-compatible endpoint overriding the AWS default. Only read for
    /// the thumbnail store.
    pub endpoint_url: Option<String>,
}

/// Fully resolved, immutable settings. Built once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Access key pair.
    pub credentials: Credentials,
    /// Store holding the original images.
    pub original: StoreSettings,
    /// Store thumbnails are written to.
    pub thumbnail: StoreSettings,
}

/// Access key pair. `Debug` redacts the secret.
#[derive(Clone)]
pub struct Credentials {
    /// AWS access key id.
    pub access_key_id: String,
    /// AWS secret access key.
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Resolved location of one object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    /// AWS region.
    pub region: String,
    /// Bucket name.
    pub bucket: String,
    /// S3-compatible endpoint overriding the AWS default.
    pub endpoint_url: Option<String>,
}

impl StoreSettings {
    /// Bucket and region public URLs are formatted against.
    #[must_use]
    pub fn destination(&self) -> Destination {
        Destination { bucket: self.bucket.clone(), region: self.region.clone() }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "access_key_id: {}", self.credentials.access_key_id)?;
        writeln!(f, "secret_access_key: <redacted>")?;
        write_store(f, "original", &self.original)?;
        write_store(f, "thumbnail", &self.thumbnail)
    }
}

fn write_store(f: &mut fmt::Formatter<'_>, name: &str, store: &StoreSettings) -> fmt::Result {
    writeln!(f, "{name}.region: {}", store.region)?;
    writeln!(f, "{name}.bucket: {}", store.bucket)?;
    if let Some(ref endpoint) = store.endpoint_url {
        writeln!(f, "{name}.endpoint_url: {endpoint}")?;
    }
    Ok(())
}

impl Config {
    /// Load configuration from the given path, or return an empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Resolve settings, preferring process environment variables over the
    /// config file.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::MissingSetting`] for the first required
    /// setting found in neither place.
    pub fn resolve(&self) -> Result<Settings, ThumbnailError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve settings using `env` to look up environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::MissingSetting`] for the first required
    /// setting found in neither place.
    pub fn resolve_with<F>(&self, env: F) -> Result<Settings, ThumbnailError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Settings {
            credentials: Credentials {
                access_key_id: required(
                    &env,
                    "credentials.access_key_id",
                    "AWS_ACCESS_KEY_ID",
                    self.credentials.access_key_id.as_deref(),
                )?,
                secret_access_key: required(
                    &env,
                    "credentials.secret_access_key",
                    "AWS_SECRET_ACCESS_KEY",
                    self.credentials.secret_access_key.as_deref(),
                )?,
            },
            original: StoreSettings {
                region: required(
                    &env,
                    "original.region",
                    "AWS_ORIGINAL_REGION",
                    self.original.region.as_deref(),
                )?,
                bucket: required(
                    &env,
                    "original.bucket",
                    "AWS_ORIGINAL_BUCKET_NAME",
                    self.original.bucket.as_deref(),
                )?,
                endpoint_url: None,
            },
            thumbnail: self.thumbnail_store(&env)?,
        })
    }

    /// Resolve only the thumbnail bucket and region, the settings a replayed
    /// run needs to format URLs.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::MissingSetting`] if the thumbnail bucket or
    /// region is missing.
    pub fn resolve_destination(&self) -> Result<Destination, ThumbnailError> {
        self.resolve_destination_with(|name| std::env::var(name).ok())
    }

    /// [`Config::resolve_destination`] with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbnailError::MissingSetting`] if the thumbnail bucket or
    /// region is missing.
    pub fn resolve_destination_with<F>(&self, env: F) -> Result<Destination, ThumbnailError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(self.thumbnail_store(&env)?.destination())
    }

    fn thumbnail_store<F>(&self, env: &F) -> Result<StoreSettings, ThumbnailError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(StoreSettings {
            region: required(
                env,
                "thumbnail.region",
                "AWS_THUMBNAIL_REGION",
                self.thumbnail.region.as_deref(),
            )?,
            bucket: required(
                env,
                "thumbnail.bucket",
                "AWS_THUMBNAIL_BUCKET_NAME",
                self.thumbnail.bucket.as_deref(),
            )?,
            endpoint_url: lookup(
                env,
                "AWS_THUMBNAIL_ENDPOINT_URL",
                self.thumbnail.endpoint_url.as_deref(),
            ),
        })
    }
}

/// Environment value if set and non-empty, else the config file value if
/// non-empty.
fn lookup<F>(env: &F, env_var: &str, file: Option<&str>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(env_var)
        .filter(|v| !v.is_empty())
        .or_else(|| file.filter(|v| !v.is_empty()).map(str::to_string))
}

fn required<F>(
    env: &F,
    setting: &str,
    env_var: &str,
    file: Option<&str>,
) -> Result<String, ThumbnailError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(env, env_var, file).ok_or_else(|| ThumbnailError::MissingSetting {
        setting: setting.to_string(),
        env_var: env_var.to_string(),
    })
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `THUMBNAILER_CONFIG` environment variable
/// 3. `~/.config/thumbnailer/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("THUMBNAILER_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/thumbnailer/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/thumbnailer/config.toml")
    } else {
        PathBuf::from("thumbnailer.toml")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("AWS_ACCESS_KEY_ID", "AKIAENV"),
            ("AWS_SECRET_ACCESS_KEY", "env-secret"),
            ("AWS_ORIGINAL_REGION", "us-east-1"),
            ("AWS_ORIGINAL_BUCKET_NAME", "originals"),
            ("AWS_THUMBNAIL_REGION", "ap-northeast-2"),
            ("AWS_THUMBNAIL_BUCKET_NAME", "thumbs"),
        ])
    }

    fn env_lookup<'a>(
        env: &'a HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| env.get(name).map(|v| (*v).to_string())
    }

    #[test]
    fn load_nonexistent_returns_empty() {
        let config = Config::load(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert!(config.thumbnail.bucket.is_none());
        assert!(config.credentials.access_key_id.is_none());
    }

    #[test]
    fn load_valid_toml() {
        let dir = std::env::temp_dir().join("thumbnailer_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[credentials]
access_key_id = "AKIAFILE"
secret_access_key = "file-secret"

[original]
region = "eu-west-1"
bucket = "file-originals"

[thumbnail]
region = "eu-west-2"
bucket = "file-thumbs"
endpoint_url = "http://localhost:4566"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        let settings = config.resolve_with(|_| None).unwrap();
        assert_eq!(settings.credentials.access_key_id, "AKIAFILE");
        assert_eq!(settings.credentials.secret_access_key, "file-secret");
        assert_eq!(settings.original.bucket, "file-originals");
        assert_eq!(settings.original.region, "eu-west-1");
        assert!(settings.original.endpoint_url.is_none());
        assert_eq!(settings.thumbnail.bucket, "file-thumbs");
        assert_eq!(settings.thumbnail.region, "eu-west-2");
        assert_eq!(settings.thumbnail.endpoint_url.as_deref(), Some("http://localhost:4566"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_invalid_toml() {
        let dir = std::env::temp_dir().join("thumbnailer_config_bad_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        assert!(Config::load(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn resolve_from_env_only() {
        let env = full_env();
        let settings = Config::default().resolve_with(env_lookup(&env)).unwrap();
        assert_eq!(settings.thumbnail.destination(), Destination {
            bucket: "thumbs".into(),
            region: "ap-northeast-2".into(),
        });
        assert_eq!(settings.original.bucket, "originals");
    }

    #[test]
    fn env_overrides_file() {
        let config = Config {
            thumbnail: StoreConfig {
                region: Some("eu-west-2".into()),
                bucket: Some("from-file".into()),
                endpoint_url: None,
            },
            ..Config::default()
        };
        let env = full_env();
        let settings = config.resolve_with(env_lookup(&env)).unwrap();
        assert_eq!(settings.thumbnail.bucket, "thumbs");
        assert_eq!(settings.thumbnail.region, "ap-northeast-2");
    }

    #[test]
    fn missing_bucket_fails_fast() {
        let mut env = full_env();
        env.remove("AWS_THUMBNAIL_BUCKET_NAME");
        let err = Config::default().resolve_with(env_lookup(&env)).unwrap_err();
        match err {
            ThumbnailError::MissingSetting { setting, env_var } => {
                assert_eq!(setting, "thumbnail.bucket");
                assert_eq!(env_var, "AWS_THUMBNAIL_BUCKET_NAME");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut env = full_env();
        env.insert("AWS_SECRET_ACCESS_KEY", "");
        let err = Config::default().resolve_with(env_lookup(&env)).unwrap_err();
        assert!(err.to_string().contains("AWS_SECRET_ACCESS_KEY"));
    }

    #[test]
    fn display_redacts_secret() {
        let env = full_env();
        let settings = Config::default().resolve_with(env_lookup(&env)).unwrap();
        let shown = settings.to_string();
        assert!(shown.contains("AKIAENV"));
        assert!(shown.contains("original.bucket: originals"));
        assert!(shown.contains("thumbnail.region: ap-northeast-2"));
        assert!(!shown.contains("env-secret"));
        assert!(!format!("{settings:?}").contains("env-secret"));
    }

    #[test]
    fn original_store_has_no_endpoint() {
        let config = Config {
            original: StoreConfig {
                region: None,
                bucket: None,
                endpoint_url: Some("http://localhost:9000".into()),
            },
            ..Config::default()
        };
        let mut env = full_env();
        env.insert("AWS_ORIGINAL_ENDPOINT_URL", "http://localhost:4566");
        let settings = config.resolve_with(env_lookup(&env)).unwrap();
        assert!(settings.original.endpoint_url.is_none());
        assert!(!settings.to_string().contains("original.endpoint_url"));
    }

    #[test]
    fn destination_needs_only_thumbnail_settings() {
        let env = HashMap::from([
            ("AWS_THUMBNAIL_REGION", "ap-northeast-2"),
            ("AWS_THUMBNAIL_BUCKET_NAME", "thumbs"),
        ]);
        let destination = Config::default().resolve_destination_with(env_lookup(&env)).unwrap();
        assert_eq!(destination, Destination {
            bucket: "thumbs".into(),
            region: "ap-northeast-2".into(),
        });
        assert!(Config::default().resolve_with(env_lookup(&env)).is_err());
    }

    #[test]
    fn destination_still_fails_fast() {
        let env = HashMap::from([("AWS_THUMBNAIL_BUCKET_NAME", "thumbs")]);
        let err = Config::default().resolve_destination_with(env_lookup(&env)).unwrap_err();
        assert!(err.to_string().contains("AWS_THUMBNAIL_REGION"));
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-config.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-config.toml"));
    }
}

//! `parley config` — Configuration management commands.

use std::path::Path;

use parley_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if config.primary.url.trim_end_matches('/') == config.fallback.url.trim_end_matches('/')
            {
                warnings.push("Primary and fallback point at the same endpoint");
            }

            if config.primary.timeout_secs.is_none() {
                warnings.push("No primary timeout: a hung primary will never fall back");
            }

            if !config.widget.error_template.contains("{error}") {
                warnings.push("widget.error_template does not include {error}");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Primary:   {}", config.primary.url);
            println!("   Fallback:  {}", config.fallback.url);
            println!("   Query:     {}", config.service.query_path);
            println!("   Fields:    {}", config.service.answer_fields.join(", "));
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}

pub async fn init(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");

    if write_default(&config_path, force)? {
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Point primary.url at your answering service");
        println!("   2. Run: parley status");
        println!("   3. Run: parley chat");
    } else {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Re-run with --force to overwrite it.");
    }

    Ok(())
}

/// Write the default config to `path`, creating parent directories.
/// Returns `false` without touching an existing file unless `force` is set.
fn write_default(path: &Path, force: bool) -> std::io::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_valid() {
        let path = AppConfig::config_dir().join("config.toml");
        assert!(path.to_str().unwrap().contains(".parley"));
    }

    #[test]
    fn init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(write_default(&path, false).unwrap());
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.primary.url, "http://localhost:8000");
        assert_eq!(config.primary.timeout_secs, Some(50));
    }

    #[test]
    fn init_keeps_existing_file_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[primary]\nurl = \"http://custom:9000\"\n").unwrap();

        assert!(!write_default(&path, false).unwrap());
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.primary.url, "http://custom:9000");

        assert!(write_default(&path, true).unwrap());
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.primary.url, "http://localhost:8000");
    }
}

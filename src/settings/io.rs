use directories_next::ProjectDirs;
use std::fs;
use std::io::{self, BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "TableSync";
const APPLICATION: &str = "tablesync";
const CONFIG_FILE: &str = "engine_settings.json";
const PATH_OVERRIDE_VAR: &str = "TABLESYNC_SETTINGS";

/// Settings file location: `TABLESYNC_SETTINGS` (also read from `.env`) or the
/// platform config directory.
pub fn get_config_path() -> io::Result<PathBuf> {
    let _ = dotenvy::dotenv();
    if let Ok(path) = std::env::var(PATH_OVERRIDE_VAR) {
        if !path.trim().is_empty() {
            debug!("EngineSettings: using {} override {:?}", PATH_OVERRIDE_VAR, path);
            return Ok(PathBuf::from(path));
        }
    }
    if let Some(proj_dirs) = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION) {
        let config_dir = proj_dirs.config_dir();
        fs::create_dir_all(config_dir)?;
        Ok(config_dir.join(CONFIG_FILE))
    } else {
        Err(io::Error::new(
            ErrorKind::NotFound,
            "Could not determine project directories for engine settings.",
        ))
    }
}

pub fn load_settings_from_file<T: for<'de> serde::de::Deserialize<'de> + Default>() -> io::Result<T>
{
    let config_file = get_config_path()?;
    load_settings_from_path(&config_file)
}

/// Loads settings from an explicit path. A missing file yields the default.
pub fn load_settings_from_path<T: for<'de> serde::de::Deserialize<'de> + Default>(
    config_file: &Path,
) -> io::Result<T> {
    info!("EngineSettings: Attempting to load settings from {:?}", config_file);
    match fs::File::open(config_file) {
        Ok(file) => {
            let reader = BufReader::new(file);
            match serde_json::from_reader(reader) {
                Ok(settings) => {
                    info!("EngineSettings: Successfully deserialized settings.");
                    Ok(settings)
                }
                Err(e) => {
                    error!(
                        "EngineSettings: Failed to parse settings file {:?}: {}",
                        config_file, e
                    );
                    Err(io::Error::new(
                        ErrorKind::InvalidData,
                        format!("Failed to parse settings file: {}", e),
                    ))
                }
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(
                "EngineSettings: Settings file not found at {:?}. Returning default.",
                config_file
            );
            Ok(Default::default())
        }
        Err(e) => {
            error!(
                "EngineSettings: Failed to open settings file {:?}: {}",
                config_file, e
            );
            Err(e)
        }
    }
}

pub fn save_settings_to_file<T: serde::Serialize>(settings: &T) -> io::Result<()> {
    let config_file = get_config_path()?;
    save_settings_to_path(&config_file, settings)
}

pub fn save_settings_to_path<T: serde::Serialize>(config_file: &Path, settings: &T) -> io::Result<()> {
    info!("EngineSettings: Saving settings to {:?}", config_file);
    if let Some(parent) = config_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = fs::File::create(config_file)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, settings).map_err(|e| {
        error!(
            "EngineSettings: Failed to serialize settings to {:?}: {}",
            config_file, e
        );
        io::Error::new(ErrorKind::Other, e)
    })?;
    Ok(())
}

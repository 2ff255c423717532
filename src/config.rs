//! Config can be loaded either from env vars, toml, or json. Env vars override the file.
//!
//! Currently configurable:
//! ### Launcher
//! 1. The batch submission command and the job description it submits
//! 1. The macro interpreter command, its flags and the macro it runs
//! 1. Wether to only print the command instead of running it (dry run)
//!
//! ### Logging
//! 1. The log level
//! 1. Wether or not to log to stderr
//!
//! The config dir defaults to ./config and can be moved with LAUNCHER_CONFIG_DIR.
//! Env vars are mapped by dropping the LAUNCHER prefix and joining the rest with dots,
//! so LAUNCHER_ROOT_ARGS becomes the setting root.args.

use std::{collections::HashMap, ffi::OsString, fs::File, io::Read, path::PathBuf, str::FromStr};
use toml;

pub const DEFAULT_CONFIG_DIR: &str = "./config";
pub const TOML_CONFIG_NAME: &str = "launcher_config.toml";
pub const JSON_CONFIG_NAME: &str = "launcher_config.json";

pub const DEFAULT_CONDOR_CMD: &str = "condor_submit";
pub const DEFAULT_JOB_FILE: &str = "MakeCorrelatorResponseStandalone.job";
pub const DEFAULT_ROOT_CMD: &str = "root";
pub const DEFAULT_ROOT_ARGS: &[&str] = &["-b", "-q"];
pub const DEFAULT_MACRO_FILE: &str = "MakeCorrelatorResponseStandalone.cxx";

const ENV_PREFIX: &str = "launcher";

/// Maps the keys used in the config files to the internal setting names
const FILE_KEYS: &[(&str, &str)] = &[
    ("condor_cmd", "condor.cmd"),
    ("job_file", "job.file"),
    ("root_cmd", "root.cmd"),
    ("root_args", "root.args"),
    ("macro_file", "macro.file"),
    ("dry_run", "dry.run"),
    ("log_level", "log.level"),
    ("log_to_stderr", "log.to.stderr"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: log::LevelFilter,
    pub log_to_stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: log::LevelFilter::Warn,
            log_to_stderr: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub condor_cmd: String,
    pub job_file: PathBuf,
    pub root_cmd: String,
    pub root_args: Vec<String>,
    pub macro_file: PathBuf,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            condor_cmd: DEFAULT_CONDOR_CMD.to_owned(),
            job_file: PathBuf::from(DEFAULT_JOB_FILE),
            root_cmd: DEFAULT_ROOT_CMD.to_owned(),
            root_args: DEFAULT_ROOT_ARGS.iter().map(|s| (*s).to_owned()).collect(),
            macro_file: PathBuf::from(DEFAULT_MACRO_FILE),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SettingValue {
    Str(String),
    Array(Vec<String>),
    Boolean(bool),
}

fn setting_from_toml(key: &str, val: &toml::Value) -> Result<SettingValue, String> {
    match val {
        toml::Value::String(s) => Ok(SettingValue::Str(s.clone())),
        toml::Value::Boolean(b) => Ok(SettingValue::Boolean(*b)),
        toml::Value::Array(elems) => elems
            .iter()
            .map(|e| match e {
                toml::Value::String(s) => Ok(s.clone()),
                _ => Err(format!("Only strings are allowed in the array: {}", key)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(SettingValue::Array),
        _ => Err(format!("Unsupported value type for setting: {}", key)),
    }
}

fn setting_from_json(key: &str, val: &serde_json::Value) -> Result<SettingValue, String> {
    match val {
        serde_json::Value::String(s) => Ok(SettingValue::Str(s.clone())),
        serde_json::Value::Bool(b) => Ok(SettingValue::Boolean(*b)),
        serde_json::Value::Array(elems) => elems
            .iter()
            .map(|e| match e {
                serde_json::Value::String(s) => Ok(s.clone()),
                _ => Err(format!("Only strings are allowed in the array: {}", key)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(SettingValue::Array),
        _ => Err(format!("Unsupported value type for setting: {}", key)),
    }
}

fn load_toml(
    config_path: &PathBuf,
    settings: &mut HashMap<String, SettingValue>,
) -> Result<(), String> {
    let mut file =
        File::open(config_path).map_err(|e| format!("Error while opening config file: {}", e))?;
    let mut config = String::new();
    file.read_to_string(&mut config)
        .map_err(|e| format!("Error while reading config file: {}", e))?;

    let toml_conf: toml::Value =
        toml::from_str(&config).map_err(|e| format!("Error while decoding config toml: {}", e))?;

    if let toml::Value::Table(map) = &toml_conf {
        for (file_key, setting_key) in FILE_KEYS {
            if let Some(val) = map.get(*file_key) {
                settings.insert(
                    (*setting_key).to_owned(),
                    setting_from_toml(file_key, val)?,
                );
            }
        }
    }
    Ok(())
}

fn load_json(
    config_path: &PathBuf,
    settings: &mut HashMap<String, SettingValue>,
) -> Result<(), String> {
    let mut file =
        File::open(config_path).map_err(|e| format!("Error while opening config file: {}", e))?;
    let json_conf: serde_json::Value = serde_json::from_reader(&mut file)
        .map_err(|e| format!("Error while decoding config json: {}", e))?;

    if let serde_json::Value::Object(map) = &json_conf {
        for (file_key, setting_key) in FILE_KEYS {
            if let Some(val) = map.get(*file_key) {
                settings.insert(
                    (*setting_key).to_owned(),
                    setting_from_json(file_key, val)?,
                );
            }
        }
    }
    Ok(())
}

fn env_settings<I>(env: I) -> HashMap<String, SettingValue>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut settings = HashMap::new();
    // vars that are not utf8 can't be launcher settings, skip them instead of failing
    env.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .for_each(|(key, value)| {
        let mut new_key: Vec<String> = key.split('_').map(|part| part.to_lowercase()).collect();
        //drop prefix
        if new_key.len() > 1 && *new_key[0] == *ENV_PREFIX {
            new_key.remove(0);
            let new_key = new_key.join(".");
            settings.insert(new_key, SettingValue::Str(value));
        }
    });
    settings
}

fn get_string(settings: &HashMap<String, SettingValue>, key: &str) -> Result<Option<String>, String> {
    match settings.get(key) {
        None => Ok(None),
        Some(SettingValue::Str(s)) => Ok(Some(s.clone())),
        Some(_) => Err(format!("Setting {} must be a string", key)),
    }
}

fn get_bool(settings: &HashMap<String, SettingValue>, key: &str) -> Result<Option<bool>, String> {
    match settings.get(key) {
        None => Ok(None),
        Some(SettingValue::Boolean(b)) => Ok(Some(*b)),
        Some(SettingValue::Str(s)) => match s.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "" | "0" | "false" | "no" | "off" => Ok(Some(false)),
            other => Err(format!("Setting {} is not a boolean: {}", key, other)),
        },
        Some(SettingValue::Array(_)) => Err(format!("Setting {} must be a boolean", key)),
    }
}

fn get_words(
    settings: &HashMap<String, SettingValue>,
    key: &str,
) -> Result<Option<Vec<String>>, String> {
    match settings.get(key) {
        None => Ok(None),
        Some(SettingValue::Array(words)) => Ok(Some(words.clone())),
        // env vars can only carry a single string, split it like a shell would
        Some(SettingValue::Str(s)) => shlex::split(s)
            .map(Some)
            .ok_or_else(|| format!("Could not split setting {}: {}", key, s)),
        Some(SettingValue::Boolean(_)) => Err(format!("Setting {} must be a list", key)),
    }
}

fn build_logging_config(
    settings: &HashMap<String, SettingValue>,
) -> (LoggingConfig, Result<(), String>) {
    let mut log_conf = LoggingConfig::default();
    let mut res = Ok(());

    match get_string(settings, "log.level") {
        Ok(Some(level)) => match log::LevelFilter::from_str(&level) {
            Ok(level) => log_conf.level = level,
            Err(_) => res = Err(format!("Unknown log level: {}", level)),
        },
        Ok(None) => {}
        Err(e) => res = Err(e),
    }
    match get_bool(settings, "log.to.stderr") {
        Ok(Some(b)) => log_conf.log_to_stderr = b,
        Ok(None) => {}
        Err(e) => res = res.and(Err(e)),
    }

    (log_conf, res)
}

fn build_config(settings: &HashMap<String, SettingValue>) -> Result<Config, String> {
    let defaults = Config::default();
    Ok(Config {
        condor_cmd: get_string(settings, "condor.cmd")?.unwrap_or(defaults.condor_cmd),
        job_file: get_string(settings, "job.file")?
            .map(PathBuf::from)
            .unwrap_or(defaults.job_file),
        root_cmd: get_string(settings, "root.cmd")?.unwrap_or(defaults.root_cmd),
        root_args: get_words(settings, "root.args")?.unwrap_or(defaults.root_args),
        macro_file: get_string(settings, "macro.file")?
            .map(PathBuf::from)
            .unwrap_or(defaults.macro_file),
        dry_run: get_bool(settings, "dry.run")?.unwrap_or(defaults.dry_run),
    })
}

pub fn load_config() -> (LoggingConfig, Result<Config, String>) {
    load_config_from_env(std::env::vars_os())
}

/// Same as load_config but reads the given env vars instead of the process environment
pub fn load_config_from_env<I>(env: I) -> (LoggingConfig, Result<Config, String>)
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let env_settings = env_settings(env);

    let explicit_dir = match get_string(&env_settings, "config.dir") {
        Ok(dir) => dir.map(PathBuf::from),
        Err(e) => return (LoggingConfig::default(), Err(e)),
    };
    let config_dir = explicit_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR));

    let config_path_toml = config_dir.join(TOML_CONFIG_NAME);
    let config_path_json = config_dir.join(JSON_CONFIG_NAME);

    let mut settings: HashMap<String, SettingValue> = HashMap::new();

    let file_conf = match (config_path_json.exists(), config_path_toml.exists()) {
        (true, true) => Err(format!(
            "Found both json and toml conf in: {:?}",
            config_dir
        )),
        (true, false) => load_json(&config_path_json, &mut settings),
        (false, true) => load_toml(&config_path_toml, &mut settings),
        (false, false) => {
            if explicit_dir.is_some() {
                Err(format!("No config file was found in: {:?}", config_dir))
            } else {
                Ok(())
            }
        }
    };

    settings.extend(env_settings);

    let (log_conf, log_res) = build_logging_config(&settings);
    let conf = file_conf
        .and(log_res)
        .and_then(|_| build_config(&settings));

    (log_conf, conf)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn env_keys_drop_prefix() {
        let settings = env_settings(vec![
            ("LAUNCHER_ROOT_ARGS".into(), "-l".into()),
            ("LAUNCHER".into(), "ignored".into()),
            ("PATH".into(), "/usr/bin".into()),
        ]);
        assert_eq!(settings.len(), 1);
        assert_eq!(
            settings.get("root.args"),
            Some(&SettingValue::Str("-l".to_owned()))
        );
    }

    #[test]
    fn bool_strings() {
        let mut settings = HashMap::new();
        settings.insert("dry.run".to_owned(), SettingValue::Str("Yes".to_owned()));
        assert_eq!(get_bool(&settings, "dry.run"), Ok(Some(true)));
        settings.insert("dry.run".to_owned(), SettingValue::Str("0".to_owned()));
        assert_eq!(get_bool(&settings, "dry.run"), Ok(Some(false)));
        settings.insert("dry.run".to_owned(), SettingValue::Str("maybe".to_owned()));
        assert!(get_bool(&settings, "dry.run").is_err());
    }
}

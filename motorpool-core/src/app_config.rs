use motorpool_driver::ResubmissionPolicy;
use motorpool_fleet::DEFAULT_FLEET;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FleetConfig {
    #[serde(default = "default_vehicle_ids")]
    pub vehicle_ids: Vec<i64>,
}

fn default_vehicle_ids() -> Vec<i64> {
    DEFAULT_FLEET.to_vec()
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            vehicle_ids: default_vehicle_ids(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    #[serde(default = "default_min_fuel")]
    pub min_fuel_percent: u8,
    #[serde(default)]
    pub privileged_skip_checklist: bool,
    #[serde(default = "default_resubmission")]
    pub resubmission: ResubmissionPolicy,
}

fn default_min_fuel() -> u8 {
    75
}

fn default_resubmission() -> ResubmissionPolicy {
    ResubmissionPolicy::ResetAlways
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_fuel_percent: default_min_fuel(),
            privileged_skip_checklist: false,
            resubmission: default_resubmission(),
        }
    }
}

/// Emails granted the admin role on registration. Real authentication is an
/// upstream concern; this mirrors the fleet office's allow-list.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `MOTORPOOL_SERVER__PORT=8080` overrides `server.port`.
            .add_source(config::Environment::with_prefix("MOTORPOOL").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

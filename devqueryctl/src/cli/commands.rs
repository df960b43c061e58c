//! CLI argument definitions

use clap::{ArgGroup, Parser};
use devquery_core::{MasterCondition, ValueType};
use std::path::PathBuf;

/// Device value query CLI
#[derive(Parser, Debug)]
#[command(name = "devquery")]
#[command(
    version,
    about = "Read device values from a device-control server",
    long_about = None
)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["get", "get_named", "list", "state", "master_state", "completions"])
))]
pub struct Cli {
    /// Get the value of DEVICE.PARAMETER and print it
    #[arg(short = 'G', value_name = "DEVICE.PARAMETER")]
    pub get: Option<String>,

    /// Get the value of DEVICE.PARAMETER and print it as DEVICE_PARAMETER=value
    #[arg(short = 'g', value_name = "DEVICE.PARAMETER")]
    pub get_named: Option<String>,

    /// List every value of a device
    #[arg(short = 'L', long, value_name = "DEVICE")]
    pub list: Option<String>,

    /// Print the state word of each DEVICE
    #[arg(short = 'S', long, value_name = "DEVICE", num_args = 1..)]
    pub state: Option<Vec<String>>,

    /// Print the central server state, or 1/0 for whether it is in CONDITION
    #[arg(long, value_enum, value_name = "CONDITION", num_args = 0..=1)]
    pub master_state: Option<Option<StateCondition>>,

    /// Server URL (default: http://localhost:8889)
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// Login name for HTTP Basic authentication
    #[arg(long)]
    pub user: Option<String>,

    /// Password for HTTP Basic authentication
    #[arg(long)]
    pub password: Option<String>,

    /// How to interpret the value read by -G/-g
    #[arg(short = 't', long = "type", value_enum, default_value_t = ValueKind::String)]
    pub value_type: ValueKind,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// Request timeout in seconds (overrides config file)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Don't report errors on stderr
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config file path (default: ~/.config/devquery/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Don't load config file
    #[arg(long, conflicts_with = "config")]
    pub no_config: bool,

    /// Generate shell completion script
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<clap_complete::Shell>,
}

/// The single action requested on the command line
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Fetch one value; `named` prints it as `device_parameter=value`
    Get { target: String, named: bool },
    /// Fetch every value of a device
    List { device: String },
    /// Fetch the state word of each device
    State { devices: Vec<String> },
    /// Fetch the central server state, optionally testing a condition
    MasterState(Option<MasterCondition>),
    /// Print a completion script
    Completions(clap_complete::Shell),
}

impl Cli {
    /// The requested action; the argument group guarantees exactly one.
    pub fn action(&self) -> Option<Action> {
        if let Some(target) = &self.get {
            return Some(Action::Get {
                target: target.clone(),
                named: false,
            });
        }
        if let Some(target) = &self.get_named {
            return Some(Action::Get {
                target: target.clone(),
                named: true,
            });
        }
        if let Some(device) = &self.list {
            return Some(Action::List {
                device: device.clone(),
            });
        }
        if let Some(devices) = &self.state {
            return Some(Action::State {
                devices: devices.clone(),
            });
        }
        if let Some(condition) = self.master_state {
            return Some(Action::MasterState(condition.map(Into::into)));
        }
        self.completions.map(Action::Completions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StateCondition {
    /// Switched on
    On,
    /// In standby
    Standby,
    /// Soft or hard off
    Off,
    /// Night and switched on
    Rnight,
}

impl From<StateCondition> for MasterCondition {
    fn from(condition: StateCondition) -> Self {
        match condition {
            StateCondition::On => MasterCondition::On,
            StateCondition::Standby => MasterCondition::Standby,
            StateCondition::Off => MasterCondition::Off,
            StateCondition::Rnight => MasterCondition::ReadyNight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ValueKind {
    /// Value as published by the server
    String,
    /// Decimal number
    Number,
    /// Epoch-millisecond timestamp
    Date,
}

impl From<ValueKind> for ValueType {
    fn from(kind: ValueKind) -> Self {
        match kind {
            ValueKind::String => ValueType::String,
            ValueKind::Number => ValueType::Number,
            ValueKind::Date => ValueType::Date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Bare values, tables for device listings
    Plain,
    /// JSON output
    Json,
}

impl From<&OutputFormat> for crate::format::OutputFormat {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Plain => crate::format::OutputFormat::Plain,
            OutputFormat::Json => crate::format::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_get_action() {
        let cli = Cli::try_parse_from(["devquery", "-G", "centrald.infotime"]).unwrap();
        assert_eq!(
            cli.action(),
            Some(Action::Get {
                target: "centrald.infotime".to_string(),
                named: false
            })
        );
        assert_eq!(cli.value_type, ValueKind::String);
        assert_eq!(cli.format, OutputFormat::Plain);
    }

    #[test]
    fn test_named_get_with_options() {
        let cli = Cli::try_parse_from([
            "devquery",
            "-g",
            "T0.TEL_alt",
            "-u",
            "http://example.com:8889",
            "--user",
            "observer",
            "--password",
            "secret",
            "-t",
            "number",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(
            cli.action(),
            Some(Action::Get {
                target: "T0.TEL_alt".to_string(),
                named: true
            })
        );
        assert_eq!(cli.url.as_deref(), Some("http://example.com:8889"));
        assert_eq!(cli.user.as_deref(), Some("observer"));
        assert_eq!(cli.password.as_deref(), Some("secret"));
        assert_eq!(ValueType::from(cli.value_type), ValueType::Number);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_list_action() {
        let cli = Cli::try_parse_from(["devquery", "--list", "centrald"]).unwrap();
        assert_eq!(
            cli.action(),
            Some(Action::List {
                device: "centrald".to_string()
            })
        );
    }

    #[test]
    fn test_state_action() {
        let cli = Cli::try_parse_from(["devquery", "-S", "T0", "C0"]).unwrap();
        assert_eq!(
            cli.action(),
            Some(Action::State {
                devices: vec!["T0".to_string(), "C0".to_string()]
            })
        );
    }

    #[test]
    fn test_master_state_action() {
        let cli = Cli::try_parse_from(["devquery", "--master-state"]).unwrap();
        assert_eq!(cli.action(), Some(Action::MasterState(None)));

        let cli = Cli::try_parse_from(["devquery", "--master-state", "rnight"]).unwrap();
        assert_eq!(
            cli.action(),
            Some(Action::MasterState(Some(MasterCondition::ReadyNight)))
        );

        assert!(Cli::try_parse_from(["devquery", "--master-state", "dusk"]).is_err());
    }

    #[test]
    fn test_action_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["devquery"]).is_err());
        assert!(Cli::try_parse_from(["devquery", "-G", "a.b", "-L", "a"]).is_err());
        assert!(Cli::try_parse_from(["devquery", "-S", "T0", "--master-state"]).is_err());
    }

    #[test]
    fn test_get_argument_is_not_validated_by_parser() {
        // A missing separator is reported by the handler, not by clap
        let cli = Cli::try_parse_from(["devquery", "-G", "centrald"]).unwrap();
        assert!(matches!(cli.action(), Some(Action::Get { .. })));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["devquery", "-G", "a.b", "-q", "-v"]).is_err());
    }
}

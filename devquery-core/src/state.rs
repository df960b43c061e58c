//! Device and central-server state words
//!
//! Every device publishes an integer `state` next to its values. For the
//! central server the low nibble is the period of the day and bits 4-5 say
//! whether the system is on, in standby, or switched off.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device publishing the system-wide state
pub const MASTER_DEVICE: &str = "centrald";

/// Bits holding the period of the day
pub const PERIOD_MASK: u64 = 0x00f;
/// Period value for night
pub const PERIOD_NIGHT: u64 = 0x003;

/// Bits holding the on/standby/off switch
pub const ONOFF_MASK: u64 = 0x030;
pub const ONOFF_ON: u64 = 0x000;
pub const ONOFF_STANDBY: u64 = 0x010;
pub const ONOFF_SOFT_OFF: u64 = 0x020;
pub const ONOFF_HARD_OFF: u64 = 0x030;

/// State word of the central server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MasterState(pub u64);

impl MasterState {
    pub fn period(self) -> u64 {
        self.0 & PERIOD_MASK
    }

    fn switch(self) -> u64 {
        self.0 & ONOFF_MASK
    }

    /// Switched on, neither in standby nor off
    pub fn is_on(self) -> bool {
        self.switch() == ONOFF_ON
    }

    pub fn is_standby(self) -> bool {
        self.switch() == ONOFF_STANDBY
    }

    /// Soft or hard off
    pub fn is_off(self) -> bool {
        matches!(self.switch(), ONOFF_SOFT_OFF | ONOFF_HARD_OFF)
    }

    /// Night and switched on, so observations can run
    pub fn is_ready_night(self) -> bool {
        self.period() == PERIOD_NIGHT && self.is_on()
    }

    /// Whether the state satisfies `condition`
    pub fn satisfies(self, condition: MasterCondition) -> bool {
        match condition {
            MasterCondition::On => self.is_on(),
            MasterCondition::Standby => self.is_standby(),
            MasterCondition::Off => self.is_off(),
            MasterCondition::ReadyNight => self.is_ready_night(),
        }
    }
}

impl fmt::Display for MasterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Condition that can be asked of the central server's state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasterCondition {
    On,
    Standby,
    Off,
    /// Night with the system on
    #[serde(rename = "rnight")]
    ReadyNight,
}

impl MasterCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            MasterCondition::On => "on",
            MasterCondition::Standby => "standby",
            MasterCondition::Off => "off",
            MasterCondition::ReadyNight => "rnight",
        }
    }
}

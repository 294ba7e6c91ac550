//! Vital-sign rules.
//!
//! Each recognised channel maps a reading to an urgency contribution. The running urgency
//! starts at `low` and only ever rises, except that a dangerous systolic pressure or oxygen
//! saturation returns `critical` immediately. Channels are evaluated in a fixed order:
//! temperature, systolic pressure, heart rate, oxygen saturation.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use triage_types::UrgencyLevel;

/// Vital-sign channels the assessor understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VitalChannel {
    /// Body temperature, °C.
    Temperature,
    /// Systolic blood pressure, mmHg.
    BloodPressureSystolic,
    /// Heart rate, beats per minute.
    HeartRate,
    /// Peripheral oxygen saturation, %.
    OxygenSaturation,
}

impl VitalChannel {
    /// Channels in evaluation order.
    pub const EVALUATION_ORDER: [VitalChannel; 4] = [
        VitalChannel::Temperature,
        VitalChannel::BloodPressureSystolic,
        VitalChannel::HeartRate,
        VitalChannel::OxygenSaturation,
    ];

    /// Reading name as it appears in a [`VitalSigns`] mapping.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::BloodPressureSystolic => "blood_pressure_systolic",
            Self::HeartRate => "heart_rate",
            Self::OxygenSaturation => "oxygen_saturation",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::EVALUATION_ORDER
            .into_iter()
            .find(|channel| channel.key() == key)
    }
}

/// Raw vital-sign readings keyed by name.
///
/// Values are kept as supplied; numeric interpretation happens per channel so that one
/// malformed reading does not invalidate the rest. Unrecognised names are carried but ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VitalSigns(BTreeMap<String, serde_json::Value>);

impl VitalSigns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a reading.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder form of [`VitalSigns::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Numeric reading for `channel`.
    ///
    /// Returns `None` when the channel is absent, and [`CoreError::InvalidInput`] when it is
    /// present but not a number.
    pub fn reading(&self, channel: VitalChannel) -> Option<CoreResult<f64>> {
        let value = self.0.get(channel.key())?;
        Some(value.as_f64().ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "vital sign {} must be numeric, got {value}",
                channel.key()
            ))
        }))
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for VitalSigns {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Outcome of a single channel rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ChannelVerdict {
    Normal,
    Raise(UrgencyLevel),
    Critical,
}

/// Stateless evaluator mapping readings to an urgency level.
#[derive(Clone, Copy, Debug, Default)]
pub struct VitalSignsAssessor;

impl VitalSignsAssessor {
    pub fn new() -> Self {
        Self
    }

    /// Highest urgency implied by the readings; `low` when nothing is abnormal or no
    /// channel is present.
    ///
    /// Non-numeric readings for recognised channels are logged and skipped.
    pub fn assess(&self, vital_signs: &VitalSigns) -> UrgencyLevel {
        let mut urgency = UrgencyLevel::Low;

        for channel in VitalChannel::EVALUATION_ORDER {
            let value = match vital_signs.reading(channel) {
                None => continue,
                Some(Ok(value)) => value,
                Some(Err(err)) => {
                    tracing::warn!(channel = channel.key(), error = %err, "skipping vital sign");
                    continue;
                }
            };

            match channel_verdict(channel, value) {
                ChannelVerdict::Normal => {}
                ChannelVerdict::Raise(level) => urgency = urgency.max(level),
                ChannelVerdict::Critical => {
                    tracing::debug!(channel = channel.key(), value, "critical vital sign");
                    return UrgencyLevel::Critical;
                }
            }
        }

        urgency
    }
}

fn channel_verdict(channel: VitalChannel, value: f64) -> ChannelVerdict {
    match channel {
        VitalChannel::Temperature => {
            if value > 39.5 || value < 35.0 {
                ChannelVerdict::Raise(UrgencyLevel::High)
            } else if value > 38.5 || value < 36.0 {
                ChannelVerdict::Raise(UrgencyLevel::Medium)
            } else {
                ChannelVerdict::Normal
            }
        }
        VitalChannel::BloodPressureSystolic => {
            if value > 180.0 || value < 90.0 {
                ChannelVerdict::Critical
            } else if value > 140.0 || value < 100.0 {
                ChannelVerdict::Raise(UrgencyLevel::Medium)
            } else {
                ChannelVerdict::Normal
            }
        }
        VitalChannel::HeartRate => {
            if value > 120.0 || value < 50.0 {
                ChannelVerdict::Raise(UrgencyLevel::High)
            } else if value > 100.0 || value < 60.0 {
                ChannelVerdict::Raise(UrgencyLevel::Medium)
            } else {
                ChannelVerdict::Normal
            }
        }
        VitalChannel::OxygenSaturation => {
            if value < 90.0 {
                ChannelVerdict::Critical
            } else if value < 95.0 {
                ChannelVerdict::Raise(UrgencyLevel::High)
            } else {
                ChannelVerdict::Normal
            }
        }
    }
}

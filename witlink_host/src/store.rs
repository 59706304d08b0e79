use serde::ser::{Serialize, SerializeMap, Serializer};
use witlink_common::{Channel, Sample};

/// Last value seen on every channel. A channel that was never written reads
/// back as `None`, never as `0.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleStore {
    values: [Option<f64>; Channel::COUNT],
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, channel: Channel, value: f64) {
        self.values[channel.index()] = Some(value);
    }

    pub fn get(&self, channel: Channel) -> Option<f64> {
        self.values[channel.index()]
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        Channel::from_name(name).and_then(|c| self.get(c))
    }

    /// Overwrite every channel the sample carries.
    pub fn record(&mut self, sample: &Sample) {
        for (channel, value) in sample.readings() {
            self.set(channel, value);
        }
    }

    /// Channels that currently hold a value.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, f64)> + '_ {
        Channel::ALL
            .iter()
            .filter_map(|c| self.get(*c).map(|v| (*c, v)))
    }
}

/// Serialises as a map keyed by channel name, unset channels omitted.
impl Serialize for SampleStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (channel, value) in self.iter() {
            map.serialize_entry(channel.name(), &value)?;
        }
        map.end()
    }
}

use crate::core::config::ExportConfig;
use crate::core::FILES_CHANNEL;
use crate::types::{Pairs, PayloadValue};
use serde::Serialize;
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Serialized form data: a default channel plus named side channels.
///
/// Every channel keeps pairs in insertion order and allows repeated names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Payload {
    data: Pairs,
    options: BTreeMap<String, Pairs>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append pairs to the default channel, or to channel `key`.
    pub fn add(&mut self, pairs: Pairs, key: Option<&str>) {
        match key {
            None => self.data.extend(pairs),
            Some(key) => self
                .options
                .entry(key.to_string())
                .or_default()
                .extend(pairs),
        }
    }

    pub fn data(&self) -> &[(String, PayloadValue)] {
        &self.data
    }

    pub fn channel(&self, key: &str) -> Option<&[(String, PayloadValue)]> {
        self.options.get(key).map(Vec::as_slice)
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    /// First value under `name` in the default channel.
    pub fn get(&self, name: &str) -> Option<&PayloadValue> {
        self.data
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn get_all(&self, name: &str) -> Vec<&PayloadValue> {
        self.data
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.options.values().all(Vec::is_empty)
    }

    /// Request arguments for `method`, using the default channel names.
    pub fn to_requests(&self, method: &str) -> RequestArgs {
        self.to_requests_with(method, &ExportConfig::default())
    }

    /// Route the default channel to the query key for GET and to the body key
    /// otherwise; side channels are exported under their own names.
    pub fn to_requests_with(&self, method: &str, config: &ExportConfig) -> RequestArgs {
        let key = if method.eq_ignore_ascii_case("get") {
            &config.query_key
        } else {
            &config.body_key
        };

        let mut channels = BTreeMap::new();
        channels.insert(key.clone(), self.data.clone());

        for (name, pairs) in &self.options {
            let name = if name == FILES_CHANNEL {
                config.file_channel.clone()
            } else {
                name.clone()
            };
            channels
                .entry(name)
                .or_insert_with(Vec::new)
                .extend(pairs.iter().cloned());
        }

        RequestArgs { channels }
    }
}

/// Keyword arguments for the transport: channel name to ordered pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestArgs {
    channels: BTreeMap<String, Pairs>,
}

impl RequestArgs {
    pub fn get(&self, channel: &str) -> Option<&[(String, PayloadValue)]> {
        self.channels.get(channel).map(Vec::as_slice)
    }

    pub fn params(&self) -> Option<&[(String, PayloadValue)]> {
        self.get("params")
    }

    pub fn data(&self) -> Option<&[(String, PayloadValue)]> {
        self.get("data")
    }

    pub fn files(&self) -> Option<&[(String, PayloadValue)]> {
        self.get(FILES_CHANNEL)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[(String, PayloadValue)])> {
        self.channels
            .iter()
            .map(|(name, pairs)| (name.as_str(), pairs.as_slice()))
    }

    pub fn into_inner(self) -> BTreeMap<String, Pairs> {
        self.channels
    }

    /// Text pairs of a channel as `application/x-www-form-urlencoded`.
    ///
    /// File values cannot be url-encoded and are left out.
    pub fn encoded(&self, channel: &str) -> Option<String> {
        let pairs = self.channels.get(channel)?;
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in pairs {
            if let PayloadValue::Text(text) = value {
                serializer.append_pair(name, text);
            }
        }
        Some(serializer.finish())
    }
}

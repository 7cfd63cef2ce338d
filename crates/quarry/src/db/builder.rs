use super::Db;

use quarry_core::{driver::Driver, Result};

use std::{collections::HashMap, sync::Arc};

/// Builder for a [`Db`] handle.
///
/// Connections are registered by name; the first registered connection
/// becomes the default unless [`default_connection`](Self::default_connection)
/// names another. The keep-alive set is connected eagerly by
/// [`build`](Self::build); everything else connects lazily on first use.
#[derive(Default)]
pub struct Builder {
    connections: Vec<(String, Arc<dyn Driver>)>,
    default: Option<String>,
    keep_alive: Vec<String>,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn connection(mut self, name: impl Into<String>, driver: impl Driver) -> Self {
        self.connections.push((name.into(), Arc::new(driver)));
        self
    }

    pub fn default_connection(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    pub fn keep_alive<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep_alive.extend(names.into_iter().map(Into::into));
        self
    }

    pub async fn build(self) -> Result<Db> {
        let default = match &self.default {
            Some(name) => name.clone(),
            None => match self.connections.first() {
                Some((name, _)) => name.clone(),
                None => return Err(quarry_core::err!("no connections configured")),
            },
        };

        let mut connections: HashMap<String, Arc<dyn Driver>> = HashMap::new();
        for (name, driver) in self.connections {
            if connections.insert(name.clone(), driver).is_some() {
                return Err(quarry_core::err!("duplicate connection `{name}`"));
            }
        }

        if !connections.contains_key(&default) {
            return Err(quarry_core::err!(
                "default connection `{default}` is not configured"
            ));
        }

        for name in &self.keep_alive {
            let driver = connections
                .get(name)
                .ok_or_else(|| quarry_core::err!("keep-alive connection `{name}` is not configured"))?;
            driver.connect().await?;
            tracing::debug!(target: "quarry::db", connection = name.as_str(), "connected");
        }

        Ok(Db {
            connections: Arc::new(connections),
            default,
        })
    }
}

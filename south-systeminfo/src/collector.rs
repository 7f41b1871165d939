//! Gathers every metric group into reading envelopes.

use south_common::{Reading, ReadingMap, Result, local_timestamp};
use tracing::debug;

use crate::parser;
use crate::source::SystemSource;

/// Readings from one poll, sharing a timestamp and asset prefix.
struct Batch<'a> {
    prefix: &'a str,
    timestamp: String,
    readings: Vec<Reading>,
}

impl<'a> Batch<'a> {
    fn new(prefix: &'a str) -> Self {
        Self {
            prefix,
            timestamp: local_timestamp(),
            readings: Vec::new(),
        }
    }

    fn push(&mut self, asset: &str, values: ReadingMap) {
        self.readings.push(Reading::new(
            format!("{}{}", self.prefix, asset),
            self.timestamp.clone(),
            values,
        ));
    }

    fn push_groups(&mut self, asset: &str, groups: parser::NamedGroups) {
        for (name, values) in groups {
            self.push(&format!("{}_{}", asset, name), values);
        }
    }
}

/// Collector for host system information.
pub struct SystemCollector<S> {
    source: S,
}

impl<S: SystemSource> SystemCollector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Collect every metric group.
    ///
    /// Any failing file read or command aborts the whole collection.
    pub async fn collect(&self, prefix: &str) -> Result<Vec<Reading>> {
        let mut batch = Batch::new(prefix);

        let hostname = self.source.hostname()?;
        batch.push("hostName", single("hostName", hostname));

        let version = self.source.read_file("/proc/version").await?;
        if let Some(platform) = parser::parse_platform(&version) {
            batch.push("platform", single("platform", platform));
        }

        let uptime = self.source.read_file("/proc/uptime").await?;
        batch.push("uptime", parser::parse_uptime(&uptime));

        let loadavg = self.source.read_file("/proc/loadavg").await?;
        batch.push("loadAverage", parser::parse_loadavg(&loadavg));

        let states = self.source.run("ps", &["-e", "-o", "state"]).await?;
        batch.push("processes", parser::parse_process_states(&states));

        let mpstat = self.source.run("mpstat", &[]).await?;
        batch.push_groups("cpuUsage", parser::parse_mpstat(&mpstat));

        let meminfo = self.source.read_file("/proc/meminfo").await?;
        batch.push("memInfo", parser::parse_meminfo(&meminfo));

        let df = self.source.run("df", &["-l"]).await?;
        batch.push_groups("diskUsage", parser::parse_df(&df));

        let net_dev = self.source.read_file("/proc/net/dev").await?;
        batch.push_groups("networkTraffic", parser::parse_net_dev(&net_dev));

        let vmstat = self.source.run("vmstat", &["-s"]).await?;
        batch.push("pagingAndSwappingEvents", parser::parse_vmstat(&vmstat));

        let iostat = self.source.run("iostat", &["-xd", "2", "1"]).await?;
        batch.push_groups("diskTraffic", parser::parse_iostat(&iostat));

        debug!("Collected {} system info readings", batch.readings.len());
        Ok(batch.readings)
    }
}

fn single(key: &str, value: String) -> ReadingMap {
    let mut values = ReadingMap::new();
    values.insert(key.to_string(), value.into());
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_shares_timestamp() {
        let mut batch = Batch::new("system/");
        batch.push("uptime", ReadingMap::new());
        batch.push_groups(
            "cpuUsage",
            vec![
                ("all".to_string(), ReadingMap::new()),
                ("0".to_string(), ReadingMap::new()),
            ],
        );

        let assets: Vec<&str> = batch.readings.iter().map(|r| r.asset.as_str()).collect();
        assert_eq!(assets, vec!["system/uptime", "system/cpuUsage_all", "system/cpuUsage_0"]);
        assert!(batch.readings.iter().all(|r| r.timestamp == batch.timestamp));
        assert_ne!(batch.readings[0].key, batch.readings[1].key);
    }
}

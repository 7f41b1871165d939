//! End-to-end polls against a canned host.

use std::collections::HashMap;

use south_common::{ConfigCategory, Error, Reading, ReadingValue, Result, SouthPlugin};
use south_systeminfo::SystemInfoPlugin;
use south_systeminfo::SystemSource;
use south_systeminfo::config::default_config;
use south_systeminfo::source::command_line;

const VERSION: &str = "Linux version 6.1.0-18-amd64 (debian-kernel@lists.debian.org) (gcc-12 (Debian 12.2.0-14) 12.2.0) #1 SMP PREEMPT_DYNAMIC Debian 6.1.76-1 (2024-02-01)\n";

const UPTIME: &str = "5243.12 19833.40\n";

const LOADAVG: &str = "0.08 0.12 0.10 1/311 4242\n";

const MEMINFO: &str = "\
MemTotal:        8040200 kB
MemFree:         5112100 kB
MemAvailable:    6921300 kB
Active(file):     803212 kB
HugePages_Total:       0
";

const NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:   52360     640    0    0    0     0          0         0    52360     640    0    0    0     0       0          0
  ens3: 9823011   10211    0    3    0     0          0         0   821934    5322    0    0    0     0       0          0
";

const PS: &str = "S\nS\nS\nR\nI\nI\nS\nZ\n";

const MPSTAT: &str = "\
Linux 6.1.0-18-amd64 (edge01) \t10/16/2026 \t_x86_64_\t(2 CPU)

09:14:52     CPU    %usr   %nice    %sys %iowait    %irq   %soft  %steal  %guest  %gnice   %idle
09:14:52     all    1.25    0.00    0.61    0.04    0.00    0.02    0.00    0.00    0.00   98.08
";

const DF: &str = "\
Filesystem     1K-blocks    Used Available Use% Mounted on
udev             4000000       0   4000000   0% /dev
/dev/vda1       30830568 4821344  24417148  17% /
";

const VMSTAT: &str = "\
      8040200 K total memory
       811304 pages paged in
      2411920 pages paged out
            0 pages swapped in
            0 pages swapped out
";

const IOSTAT: &str = "\
Linux 6.1.0-18-amd64 (edge01) \t10/16/2026 \t_x86_64_\t(2 CPU)

Device            r/s     rkB/s   rrqm/s  %rrqm r_await rareq-sz     w/s     wkB/s  %util
vda              1.31     42.80     0.20  13.24    0.55    32.67    2.02     30.51   0.35

";

/// A host whose files and command output are fixed strings.
#[derive(Default)]
struct FixtureSource {
    files: HashMap<&'static str, &'static str>,
    commands: HashMap<String, &'static str>,
    /// Command that exits non-zero, with its stderr.
    failing: Option<(String, &'static str)>,
}

impl FixtureSource {
    fn healthy() -> Self {
        let files = HashMap::from([
            ("/proc/version", VERSION),
            ("/proc/uptime", UPTIME),
            ("/proc/loadavg", LOADAVG),
            ("/proc/meminfo", MEMINFO),
            ("/proc/net/dev", NET_DEV),
        ]);
        let commands = HashMap::from([
            ("ps -e -o state".to_string(), PS),
            ("mpstat".to_string(), MPSTAT),
            ("df -l".to_string(), DF),
            ("vmstat -s".to_string(), VMSTAT),
            ("iostat -xd 2 1".to_string(), IOSTAT),
        ]);
        Self {
            files,
            commands,
            failing: None,
        }
    }

    fn failing(mut self, command: &str, stderr: &'static str) -> Self {
        self.failing = Some((command.to_string(), stderr));
        self
    }
}

impl SystemSource for FixtureSource {
    fn hostname(&self) -> Result<String> {
        Ok("edge01".to_string())
    }

    async fn read_file(&self, path: &str) -> Result<String> {
        self.files
            .get(path)
            .map(|text| text.to_string())
            .ok_or_else(|| Error::Command {
                command: format!("cat {}", path),
                message: "No such file or directory".to_string(),
            })
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let command = command_line(program, args);
        if let Some((failing, stderr)) = &self.failing {
            if *failing == command {
                return Err(Error::Command {
                    command,
                    message: stderr.replace('\n', ""),
                });
            }
        }
        self.commands
            .get(&command)
            .map(|text| text.to_string())
            .ok_or_else(|| Error::Command {
                command,
                message: "command not found".to_string(),
            })
    }
}

fn find<'a>(readings: &'a [Reading], asset: &str) -> &'a Reading {
    readings
        .iter()
        .find(|r| r.asset == asset)
        .unwrap_or_else(|| panic!("no reading for {}", asset))
}

fn healthy_plugin() -> SystemInfoPlugin<FixtureSource> {
    SystemInfoPlugin::with_source(&default_config(), FixtureSource::healthy()).unwrap()
}

#[tokio::test]
async fn test_poll_produces_every_group() {
    let mut plugin = healthy_plugin();
    let readings = plugin.poll().await.unwrap();

    let assets: Vec<&str> = readings.iter().map(|r| r.asset.as_str()).collect();
    assert_eq!(
        assets,
        vec![
            "system/hostName",
            "system/platform",
            "system/uptime",
            "system/loadAverage",
            "system/processes",
            "system/cpuUsage_all",
            "system/memInfo",
            "system/diskUsage_udev",
            "system/diskUsage_dev/vda1",
            "system/networkTraffic_lo",
            "system/networkTraffic_ens3",
            "system/pagingAndSwappingEvents",
            "system/diskTraffic_vda",
        ]
    );

    // One timestamp per poll, one key per reading.
    let timestamp = &readings[0].timestamp;
    assert!(readings.iter().all(|r| &r.timestamp == timestamp));
    let mut keys: Vec<&str> = readings.iter().map(|r| r.key.as_str()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), readings.len());
}

#[tokio::test]
async fn test_poll_values() {
    let mut plugin = healthy_plugin();
    let readings = plugin.poll().await.unwrap();

    let host = find(&readings, "system/hostName");
    assert_eq!(host.get("hostName"), Some(&ReadingValue::from("edge01")));

    let platform = find(&readings, "system/platform");
    assert_eq!(platform.get("platform"), Some(&ReadingValue::from(VERSION.trim())));

    let uptime = find(&readings, "system/uptime");
    assert_eq!(uptime.get("system_seconds"), Some(&ReadingValue::Float(5243.12)));

    let processes = find(&readings, "system/processes");
    assert_eq!(processes.get("sleeping"), Some(&ReadingValue::Integer(3)));
    assert_eq!(processes.get("running"), Some(&ReadingValue::Integer(1)));
    assert_eq!(processes.get("zombie"), Some(&ReadingValue::Integer(1)));

    let cpu = find(&readings, "system/cpuUsage_all");
    assert_eq!(cpu.get("prcntg_idle"), Some(&ReadingValue::Float(98.08)));

    let mem = find(&readings, "system/memInfo");
    assert_eq!(mem.get("Activefile_KB"), Some(&ReadingValue::Integer(803212)));

    let root = find(&readings, "system/diskUsage_dev/vda1");
    assert_eq!(root.get("Use_prcntg"), Some(&ReadingValue::Integer(17)));
    assert_eq!(root.get("Mounted"), Some(&ReadingValue::from("/")));

    let net = find(&readings, "system/networkTraffic_ens3");
    assert_eq!(net.get("Receive_bytes"), Some(&ReadingValue::Integer(9823011)));
    assert_eq!(net.get("Transmit_packets"), Some(&ReadingValue::Integer(5322)));

    let paging = find(&readings, "system/pagingAndSwappingEvents");
    assert_eq!(paging.get("pagedout"), Some(&ReadingValue::Integer(2411920)));

    let traffic = find(&readings, "system/diskTraffic_vda");
    assert_eq!(traffic.get("w_per_sec"), Some(&ReadingValue::Float(2.02)));
}

#[tokio::test]
async fn test_failing_command_aborts_poll() {
    let source = FixtureSource::healthy().failing("iostat -xd 2 1", "iostat: command not found\n");
    let mut plugin = SystemInfoPlugin::with_source(&default_config(), source).unwrap();

    let err = plugin.poll().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error in executing command \"iostat -xd 2 1\". Error: iostat: command not found"
    );
}

#[tokio::test]
async fn test_missing_file_aborts_poll() {
    let mut source = FixtureSource::healthy();
    source.files.remove("/proc/loadavg");
    let mut plugin = SystemInfoPlugin::with_source(&default_config(), source).unwrap();

    assert!(matches!(plugin.poll().await, Err(Error::Command { .. })));
}

#[tokio::test]
async fn test_reconfigured_prefix_applies_to_next_poll() {
    let mut plugin = healthy_plugin();

    let mut config: ConfigCategory = default_config();
    config.set_value("assetNamePrefix", "edge01/").unwrap();
    plugin.reconfigure(config).await.unwrap();

    let readings = plugin.poll().await.unwrap();
    assert!(readings.iter().all(|r| r.asset.starts_with("edge01/")));

    plugin.shutdown().await.unwrap();
}

#[test]
fn test_sample_config_is_valid() {
    let harness = south_framework::HarnessConfig::load(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/systeminfo.json5"
    ))
    .unwrap();
    assert_eq!(harness.poll_interval_ms, Some(10000));

    let category = harness.merged_category(&default_config()).unwrap();
    let plugin = SystemInfoPlugin::with_source(&category, FixtureSource::healthy()).unwrap();
    assert_eq!(plugin.prefix(), "system/");
}

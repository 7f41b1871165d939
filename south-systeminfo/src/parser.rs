//! Parsers for `/proc` files and command output.
//!
//! Parsing is best-effort: a field that does not parse is skipped and logged
//! at debug level, the rest of the group is still reported.

use south_common::{ReadingMap, ReadingValue};
use std::str::FromStr;
use tracing::debug;

use crate::source::non_empty_lines;

/// Readings that come one per device, CPU or interface.
pub type NamedGroups = Vec<(String, ReadingMap)>;

/// Parse `text` as `T` and insert it under `key`, or log and skip it.
fn insert_parsed<T>(values: &mut ReadingMap, key: String, text: &str)
where
    T: FromStr + Into<ReadingValue>,
{
    match text.trim().parse::<T>() {
        Ok(v) => {
            values.insert(key, v.into());
        }
        Err(_) => debug!("Skipping '{}': cannot parse '{}'", key, text),
    }
}

/// First line of `/proc/version`.
pub fn parse_platform(text: &str) -> Option<String> {
    non_empty_lines(text).next().map(|line| line.trim().to_string())
}

/// `/proc/uptime`: seconds up and seconds spent idle.
pub fn parse_uptime(text: &str) -> ReadingMap {
    let mut values = ReadingMap::new();
    let mut fields = text.split_whitespace();
    for key in ["system_seconds", "idle_processes_seconds"] {
        if let Some(field) = fields.next() {
            insert_parsed::<f64>(&mut values, key.to_string(), field);
        }
    }
    values
}

/// `/proc/loadavg`: the three load averages.
pub fn parse_loadavg(text: &str) -> ReadingMap {
    let mut values = ReadingMap::new();
    let mut fields = text.split_whitespace();
    for key in ["overLast1min", "overLast5mins", "overLast15mins"] {
        if let Some(field) = fields.next() {
            insert_parsed::<f64>(&mut values, key.to_string(), field);
        }
    }
    values
}

/// `ps -e -o state`: process counts by state.
///
/// The first line is the column header.
pub fn parse_process_states(text: &str) -> ReadingMap {
    let states: Vec<&str> = non_empty_lines(text).skip(1).map(str::trim).collect();
    let count = |codes: &[&str]| states.iter().filter(|s| codes.contains(*s)).count();

    let mut values = ReadingMap::new();
    values.insert("running".to_string(), count(&["R"]).into());
    values.insert("sleeping".to_string(), count(&["S", "D"]).into());
    values.insert("stopped".to_string(), count(&["T", "t"]).into());
    values.insert("paging".to_string(), count(&["W"]).into());
    values.insert("dead".to_string(), count(&["X"]).into());
    values.insert("zombie".to_string(), count(&["Z"]).into());
    values
}

/// `mpstat`: one group per CPU row, keyed by the `CPU` column.
pub fn parse_mpstat(text: &str) -> NamedGroups {
    let mut lines = non_empty_lines(text);
    let Some((header, cpu_col)) = lines.by_ref().find_map(|line| {
        let header: Vec<&str> = line.split_whitespace().collect();
        let cpu_col = header.iter().position(|h| *h == "CPU")?;
        Some((header, cpu_col))
    }) else {
        debug!("mpstat output has no CPU header");
        return Vec::new();
    };

    let mut groups = Vec::new();
    for line in lines {
        let cols: Vec<&str> = line.split_whitespace().collect();
        let Some(cpu) = cols.get(cpu_col) else {
            continue;
        };

        let mut values = ReadingMap::new();
        for (head, col) in header.iter().zip(&cols).skip(cpu_col + 1) {
            insert_parsed::<f64>(&mut values, head.replace('%', "prcntg_"), col);
        }
        groups.push((cpu.to_string(), values));
    }
    groups
}

/// `/proc/meminfo`: every entry as an integer, with `_KB` appended when the
/// value carries a unit.
pub fn parse_meminfo(text: &str) -> ReadingMap {
    let mut values = ReadingMap::new();
    for line in non_empty_lines(text) {
        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        let fields: Vec<&str> = rest.split_whitespace().collect();
        let Some(amount) = fields.first() else {
            continue;
        };

        let suffix = if fields.len() > 1 { "_KB" } else { "" };
        let key = format!("{}{}", name, suffix)
            .replace(['(', ')'], "")
            .trim()
            .to_string();
        insert_parsed::<i64>(&mut values, key, amount);
    }
    values
}

/// `df -l`: one group per filesystem.
///
/// Lines before the `Filesystem` header (error messages on some systems) are
/// skipped. Numeric columns become integers with `%` stripped; the mount point
/// is kept as text. Device names lose their leading `/`.
pub fn parse_df(text: &str) -> NamedGroups {
    let mut lines =
        non_empty_lines(text).skip_while(|line| !line.trim_start().starts_with("Filesystem"));
    let Some(header_line) = lines.next() else {
        debug!("df output has no Filesystem header");
        return Vec::new();
    };

    let header: Vec<&str> = header_line.split_whitespace().collect();
    let mount_col = header
        .iter()
        .position(|h| *h == "Mounted")
        .unwrap_or(header.len().saturating_sub(1));

    let mut groups = Vec::new();
    for line in lines {
        let cols: Vec<&str> = line.split_whitespace().collect();
        let Some(&device) = cols.first() else {
            continue;
        };

        let mut values = ReadingMap::new();
        for (i, col) in cols.iter().enumerate().take(mount_col).skip(1) {
            let Some(head) = header.get(i) else {
                break;
            };
            insert_parsed::<i64>(&mut values, head.replace('%', "_prcntg"), &col.replace('%', ""));
        }
        if let (Some(head), Some(mount)) = (header.get(mount_col), cols.get(mount_col..)) {
            if !mount.is_empty() {
                values.insert(head.to_string(), mount.join(" ").into());
            }
        }

        let device = device.strip_prefix('/').unwrap_or(device);
        groups.push((device.to_string(), values));
    }
    groups
}

/// `/proc/net/dev`: one group per interface.
///
/// The first eight counters are `Receive_*`, the rest `Transmit_*`.
pub fn parse_net_dev(text: &str) -> NamedGroups {
    let mut lines = non_empty_lines(text).skip(1);
    let Some(header_line) = lines.next() else {
        debug!("/proc/net/dev has no column header");
        return Vec::new();
    };

    let header: Vec<String> = header_line
        .replace('|', " ")
        .split_whitespace()
        .skip(1)
        .enumerate()
        .map(|(i, name)| {
            let direction = if i < 8 { "Receive" } else { "Transmit" };
            format!("{}_{}", direction, name)
        })
        .collect();

    let mut groups = Vec::new();
    for line in lines {
        let line = line.replace(':', " ");
        let mut cols = line.split_whitespace();
        let Some(interface) = cols.next() else {
            continue;
        };

        let mut values = ReadingMap::new();
        for (head, col) in header.iter().zip(cols) {
            insert_parsed::<i64>(&mut values, head.clone(), col);
        }
        groups.push((interface.to_string(), values));
    }
    groups
}

/// `vmstat -s`: the `pages` counters, keyed by the words after `pages` with
/// spaces removed.
pub fn parse_vmstat(text: &str) -> ReadingMap {
    let mut values = ReadingMap::new();
    for line in non_empty_lines(text) {
        let Some((count, event)) = line.trim().split_once("pages") else {
            continue;
        };
        insert_parsed::<i64>(&mut values, event.replace(' ', ""), count);
    }
    values
}

/// `iostat -xd`: one group per device row after the `Device` header.
pub fn parse_iostat(text: &str) -> NamedGroups {
    let mut lines =
        non_empty_lines(text).skip_while(|line| !line.trim_start().starts_with("Device"));
    let Some(header_line) = lines.next() else {
        debug!("iostat output has no Device header");
        return Vec::new();
    };

    let header: Vec<String> = header_line
        .split_whitespace()
        .map(|h| h.replace('%', "prcntg_").replace("/s", "_per_sec"))
        .collect();

    let mut groups = Vec::new();
    for line in lines {
        let mut cols = line.split_whitespace();
        let Some(device) = cols.next() else {
            continue;
        };

        let mut values = ReadingMap::new();
        for (head, col) in header.iter().skip(1).zip(cols) {
            insert_parsed::<f64>(&mut values, head.clone(), col);
        }
        groups.push((device.to_string(), values));
    }
    groups
}

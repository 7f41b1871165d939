//! Plugin runner standing in for the host's South service.

use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use south_common::{LoggingConfig, Reconfigured, SouthPlugin, init_tracing};

use crate::PluginArgs;
use crate::config::HarnessConfig;
use crate::error::{Result, RunnerError};
use crate::sink::{BatchStats, ReadingSink, SinkStats};

/// Category item holding the poll interval in milliseconds.
pub const POLL_INTERVAL_ITEM: &str = "pollInterval";

/// Poll interval used when neither the harness nor the plugin sets one.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Drives one plugin through its lifecycle the way the host's South service does.
///
/// Handles:
/// - Building the configuration category (plugin defaults + file overrides)
/// - `init`, periodic `poll`, `reconfigure` on SIGHUP and `shutdown` on Ctrl+C
/// - Writing every poll's readings to a [`ReadingSink`]
pub struct PluginRunner<P: SouthPlugin, W: Write> {
    /// Plugin name for logging.
    name: String,
    /// The harness configuration currently applied.
    harness: HarnessConfig,
    /// File to re-read on reload.
    config_path: Option<PathBuf>,
    /// The plugin handle.
    plugin: P,
    /// Output for readings.
    sink: ReadingSink<W>,
}

impl<P: SouthPlugin, W: Write> PluginRunner<P, W> {
    /// Merge the configuration and initialise the plugin.
    pub fn new(harness: HarnessConfig, sink: ReadingSink<W>) -> Result<Self> {
        let info = P::info();
        let category = harness.merged_category(&info.config)?;
        let plugin = P::init(&category).map_err(|e| RunnerError::plugin("init", e))?;

        tracing::info!(plugin = %info.name, version = %info.version, "Plugin initialised");

        Ok(Self {
            name: info.name,
            harness,
            config_path: None,
            plugin,
            sink,
        })
    }

    /// Remember the file the configuration came from, enabling [`reload`](Self::reload).
    pub fn with_config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Get the plugin name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a reference to the plugin handle.
    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    /// Get a reference to the reading sink.
    pub fn sink(&self) -> &ReadingSink<W> {
        &self.sink
    }

    /// Consume the runner and return the sink.
    pub fn into_sink(self) -> ReadingSink<W> {
        self.sink
    }

    /// Effective poll interval.
    pub fn poll_interval(&self) -> Duration {
        let ms = self
            .harness
            .poll_interval_ms
            .or_else(|| self.plugin.config().parse::<u64>(POLL_INTERVAL_ITEM).ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        Duration::from_millis(ms)
    }

    /// Poll the plugin once and write its readings.
    pub async fn poll_once(&mut self) -> Result<BatchStats> {
        let readings = self
            .plugin
            .poll()
            .await
            .map_err(|e| RunnerError::plugin("poll", e))?;

        let batch = self.sink.write_batch(&readings);
        tracing::debug!(
            plugin = %self.name,
            written = batch.success,
            failed = batch.failed,
            "Poll complete"
        );
        Ok(batch)
    }

    /// Apply a new harness configuration through `reconfigure`.
    pub async fn reconfigure(&mut self, harness: HarnessConfig) -> Result<Reconfigured> {
        let category = harness.merged_category(&P::info().config)?;
        let outcome = self
            .plugin
            .reconfigure(category)
            .await
            .map_err(|e| RunnerError::plugin("reconfigure", e))?;

        self.sink.set_format(harness.output.format);
        self.harness = harness;

        tracing::info!(
            plugin = %self.name,
            restarted = outcome.is_restart(),
            "Plugin reconfigured"
        );
        Ok(outcome)
    }

    /// Re-read the configuration file and reconfigure the plugin.
    pub async fn reload(&mut self) -> Result<Reconfigured> {
        let Some(path) = self.config_path.clone() else {
            return Err(RunnerError::config("No configuration file to reload"));
        };
        let harness = HarnessConfig::load(&path)?;
        self.reconfigure(harness).await
    }

    /// Shut the plugin down.
    pub async fn shutdown(&mut self) -> Result<SinkStats> {
        self.plugin
            .shutdown()
            .await
            .map_err(|e| RunnerError::plugin("shutdown", e))?;

        let stats = self.sink.stats();
        tracing::info!(
            plugin = %self.name,
            polls = stats.polls,
            written = stats.written,
            failed = stats.failed,
            "Plugin shut down"
        );
        Ok(stats)
    }

    /// Poll until Ctrl+C is received.
    ///
    /// Poll errors are logged and polling continues. SIGHUP reloads the
    /// configuration file.
    pub async fn run(mut self) -> Result<SinkStats> {
        let mut period = self.poll_interval();
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut reload = ReloadSignal::new()?;
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        tracing::info!(
            plugin = %self.name,
            interval_ms = period.as_millis() as u64,
            "Polling. Press Ctrl+C to stop."
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        tracing::error!(plugin = %self.name, error = %e, "Poll failed");
                    }
                }
                Some(()) = reload.recv() => {
                    tracing::info!(plugin = %self.name, "Reloading configuration");
                    if let Err(e) = self.reload().await {
                        tracing::warn!(plugin = %self.name, error = %e, "Reload failed");
                    }
                    let new_period = self.poll_interval();
                    if new_period != period {
                        period = new_period;
                        ticker = tokio::time::interval_at(Instant::now() + period, period);
                        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                        tracing::info!(
                            interval_ms = period.as_millis() as u64,
                            "Poll interval changed"
                        );
                    }
                }
                res = &mut ctrl_c => {
                    if let Err(e) = res {
                        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                    }
                    tracing::info!(plugin = %self.name, "Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown().await
    }
}

#[cfg(unix)]
struct ReloadSignal(tokio::signal::unix::Signal);

#[cfg(unix)]
impl ReloadSignal {
    fn new() -> Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self(signal(SignalKind::hangup())?))
    }

    async fn recv(&mut self) -> Option<()> {
        self.0.recv().await
    }
}

#[cfg(not(unix))]
struct ReloadSignal;

#[cfg(not(unix))]
impl ReloadSignal {
    fn new() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> Option<()> {
        std::future::pending().await
    }
}

/// Entry point shared by the plugin binaries.
///
/// # Example
///
/// ```ignore
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     south_framework::run_plugin::<MyPlugin>("myplugin.json5").await
/// }
/// ```
pub async fn run_plugin<P: SouthPlugin>(default_config: &'static str) -> anyhow::Result<()> {
    PluginMain::<P>::new(PluginArgs::parse_with_default(default_config))
        .run()
        .await
}

/// Binary entry point state, split out so the argument handling is testable.
struct PluginMain<P> {
    args: PluginArgs,
    _plugin: PhantomData<P>,
}

impl<P: SouthPlugin> PluginMain<P> {
    fn new(args: PluginArgs) -> Self {
        Self {
            args,
            _plugin: PhantomData,
        }
    }

    async fn run(self) -> anyhow::Result<()> {
        if self.args.info {
            let info = serde_json::to_string_pretty(&P::info())?;
            println!("{}", info);
            return Ok(());
        }

        let harness = HarnessConfig::load(&self.args.config).map_err(|e| {
            anyhow::anyhow!("Failed to load config from {:?}: {}", self.args.config, e)
        })?;

        let log_config = LoggingConfig {
            level: self
                .args
                .log_level
                .clone()
                .unwrap_or_else(|| harness.logging.level.clone()),
            format: harness.logging.format,
        };
        init_tracing(&log_config).map_err(|e| anyhow::anyhow!("Failed to init tracing: {}", e))?;

        tracing::info!(config = ?self.args.config, "Loaded configuration");

        let sink = ReadingSink::stdout(harness.output.format);
        let mut runner = PluginRunner::<P, _>::new(harness, sink)
            .map_err(|e| anyhow::anyhow!("{}", e))?
            .with_config_path(&self.args.config);

        if self.args.once {
            let poll = runner.poll_once().await;
            runner.shutdown().await.map_err(|e| anyhow::anyhow!("{}", e))?;
            poll.map_err(|e| anyhow::anyhow!("{}", e))?;
            return Ok(());
        }

        runner.run().await.map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use south_common::{
        ConfigCategory, ConfigItem, Error, Format, ItemType, PluginInfo, Reading, ReadingMap,
    };

    struct Ticker {
        config: ConfigCategory,
        polls: i64,
        fail_next: bool,
        shut_down: bool,
    }

    impl SouthPlugin for Ticker {
        fn info() -> PluginInfo {
            PluginInfo::south_poll(
                "ticker",
                "0.1.0",
                ConfigCategory::new()
                    .with_item(
                        "assetName",
                        ConfigItem::new(ItemType::String, "Asset name", "tick"),
                    )
                    .with_item(
                        POLL_INTERVAL_ITEM,
                        ConfigItem::new(ItemType::Integer, "Poll interval", "500"),
                    ),
            )
        }

        fn init(config: &ConfigCategory) -> south_common::Result<Self> {
            Ok(Self {
                config: config.clone(),
                polls: 0,
                fail_next: false,
                shut_down: false,
            })
        }

        fn config(&self) -> &ConfigCategory {
            &self.config
        }

        async fn poll(&mut self) -> south_common::Result<Vec<Reading>> {
            if std::mem::take(&mut self.fail_next) {
                return Err(Error::data_retrieval("device offline"));
            }
            self.polls += 1;
            let asset = self.config.value("assetName").unwrap_or_default();
            Ok(vec![
                Reading::new(asset, "t", ReadingMap::new()).with_value("n", self.polls),
            ])
        }

        async fn reconfigure(
            &mut self,
            new_config: ConfigCategory,
        ) -> south_common::Result<Reconfigured> {
            let restart = !self.config.diff(&new_config).is_empty();
            self.config = new_config;
            Ok(if restart {
                Reconfigured::Restarted
            } else {
                Reconfigured::Updated
            })
        }

        async fn shutdown(&mut self) -> south_common::Result<()> {
            self.shut_down = true;
            Ok(())
        }
    }

    fn runner() -> PluginRunner<Ticker, Vec<u8>> {
        PluginRunner::new(
            HarnessConfig::default(),
            ReadingSink::new(Vec::new(), Format::Json),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_poll_writes_readings() {
        let mut runner = runner();
        runner.poll_once().await.unwrap();
        runner.poll_once().await.unwrap();

        let out = String::from_utf8(runner.into_sink().into_inner()).unwrap();
        let readings: Vec<Reading> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].asset, "tick");
        assert_eq!(readings[1].get("n").and_then(|v| v.as_f64()), Some(2.0));
    }

    #[tokio::test]
    async fn test_poll_error_is_reported() {
        let mut runner = runner();
        runner.plugin.fail_next = true;
        let err = runner.poll_once().await.unwrap_err();
        assert!(matches!(err, RunnerError::Plugin { call: "poll", .. }));

        // The next poll succeeds again.
        assert_eq!(runner.poll_once().await.unwrap().success, 1);
    }

    #[test]
    fn test_poll_interval_sources() {
        let mut runner = runner();
        assert_eq!(runner.poll_interval(), Duration::from_millis(500));

        runner.harness.poll_interval_ms = Some(50);
        assert_eq!(runner.poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_init_with_bad_override_fails() {
        let harness: HarnessConfig =
            json5::from_str(r#"{ config: { pollInterval: "soon" } }"#).unwrap();
        let result =
            PluginRunner::<Ticker, _>::new(harness, ReadingSink::new(Vec::new(), Format::Json));
        assert!(matches!(result, Err(RunnerError::ConfigValidation(_))));
    }

    #[test]
    fn test_reload_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ config: {{ assetName: "renamed", pollInterval: 2000 }} }}"#).unwrap();

        let mut runner = runner().with_config_path(file.path());
        let outcome = tokio_test::block_on(runner.reload()).unwrap();
        assert_eq!(outcome, Reconfigured::Restarted);
        assert_eq!(runner.plugin().config().value("assetName"), Some("renamed"));
        assert_eq!(runner.poll_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_reload_without_path_fails() {
        let mut runner = runner();
        assert!(matches!(
            tokio_test::block_on(runner.reload()),
            Err(RunnerError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_shutdown_reports_stats() {
        let mut runner = runner();
        runner.poll_once().await.unwrap();
        let stats = runner.shutdown().await.unwrap();
        assert!(runner.plugin().shut_down);
        assert_eq!(stats.polls, 1);
        assert_eq!(stats.written, 1);
    }

    #[tokio::test]
    async fn test_info_flag_skips_config() {
        let args = PluginArgs {
            config: PathBuf::from("/nonexistent/ticker.json5"),
            log_level: None,
            info: true,
            once: false,
        };
        PluginMain::<Ticker>::new(args).run().await.unwrap();
    }
}

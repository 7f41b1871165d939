//! Runs the systeminfo plugin from the command line.

use south_systeminfo::SystemInfoPlugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    south_framework::run_plugin::<SystemInfoPlugin>("systeminfo.json5").await
}

//! Runs the B100 plugin from the command line.

use south_b100::B100Plugin;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    south_framework::run_plugin::<B100Plugin>("b100.json5").await
}

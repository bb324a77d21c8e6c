use anyhow::{bail, Context, Result};
use saveage::client::ApiClient;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: upload_rates <rates.csv> [rate set name]");
    };
    let name = args.next();

    let path = Path::new(&path);
    let file_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .context("file path has no usable file name")?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    let client = ApiClient::from_env();
    let master = client
        .upload_rates(file_name, bytes, name.as_deref())
        .await?;
    info!(
        rate_master_id = master.rate_master_id,
        rate_master_name = %master.rate_master_name,
        "rate table uploaded"
    );
    println!("{}", master.rate_master_id);
    Ok(())
}

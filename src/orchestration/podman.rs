//! Podman image export

use crate::error::DrctlResult;
use crate::process::{Cmd, CommandRunner};
use std::path::Path;
use tracing::info;

/// Save `image` from local podman storage into an archive at `tar`
pub async fn save_image(runner: &dyn CommandRunner, image: &str, tar: &Path) -> DrctlResult<()> {
    info!("Saving image '{}'", image);

    let cmd = Cmd::new("podman")
        .args(["save", image, "-o"])
        .arg(tar.display().to_string());
    runner.run(&cmd).await?;
    Ok(())
}

//! `autostep build`

use autostep_extensions::ExtensionLoader;
use tokio_util::sync::CancellationToken;

use super::build_project;
use crate::args::ProjectArgs;
use crate::errors::CommandError;

/// Build the project. Succeeds when compile and link report no errors.
pub async fn execute(
    args: &ProjectArgs,
    loader: &dyn ExtensionLoader,
    cancel: &CancellationToken,
) -> Result<bool, CommandError> {
    let built = build_project(args, loader, cancel).await?;
    Ok(built.verdict.success)
}

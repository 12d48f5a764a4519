use super::{prompts, Context};
use crate::output::Output;
use cinerate_core::seed::bundled_movies;
use color_eyre::eyre::eyre;
use color_eyre::Result;

pub async fn run_seed(reset: bool, yes: bool, ctx: &Context, output: &Output) -> Result<()> {
    if reset && !yes && !prompts::prompt_yes_no("Delete every movie and review before seeding?", false)? {
        output.info("Cancelled");
        return Ok(());
    }

    let drafts = bundled_movies().map_err(|e| eyre!("{:#}", e))?;
    let report = ctx.services.catalog.seed(drafts, reset).await?;

    if report.cleared {
        output.warn("Removed all existing movies and reviews");
    }
    output.success(format!(
        "Seeded {} movie(s), {} already present",
        report.created, report.already_present
    ));
    output.data(&report);
    Ok(())
}

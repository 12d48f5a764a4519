use super::Context;
use crate::output::Output;
use color_eyre::Result;

pub async fn run_reconcile(ctx: &Context, output: &Output) -> Result<()> {
    let report = ctx.services.reconcile().await?;

    if report.movies_corrected == 0 && report.orphaned_reviews_removed == 0 {
        output.success(format!("All {} movie(s) consistent", report.movies_checked));
    } else {
        output.warn(format!(
            "Corrected {} of {} movie(s), removed {} orphaned review(s)",
            report.movies_corrected, report.movies_checked, report.orphaned_reviews_removed
        ));
    }
    output.data(&report);
    Ok(())
}

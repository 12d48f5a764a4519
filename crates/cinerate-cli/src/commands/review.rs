use super::movie::render_reviews;
use super::Context;
use crate::output::Output;
use crate::ReviewCommands;
use cinerate_core::ReviewQuery;
use cinerate_models::{ReviewDraft, UserId};
use color_eyre::Result;
use serde_json::json;

pub async fn run_review(cmd: ReviewCommands, ctx: &Context, output: &Output) -> Result<()> {
    let reviews = &ctx.services.reviews;

    match cmd {
        ReviewCommands::Add {
            movie_id,
            user,
            rating,
            content,
        } => {
            let review = reviews
                .create_review(movie_id, UserId::new(user), ReviewDraft::new(rating, content))
                .await?;
            output.success(format!("Review {} added", review.id));
            output.data(&review);
        }
        ReviewCommands::Edit {
            review_id,
            user,
            rating,
            content,
        } => {
            let review = reviews
                .update_review(review_id, UserId::new(user), ReviewDraft::new(rating, content))
                .await?;
            output.success(format!("Review {} updated", review.id));
            output.data(&review);
        }
        ReviewCommands::Rm { review_id, user } => {
            let review = reviews.delete_review(review_id, UserId::new(user)).await?;
            output.success(format!("Review {} deleted", review.id));
            output.data(&json!({ "deleted": review.id }));
        }
        ReviewCommands::Like { review_id, user } => {
            let user = UserId::new(user);
            let review = reviews.toggle_like(review_id, user.clone()).await?;
            let verb = if review.likes.contains(&user) { "Liked" } else { "Unliked" };
            output.success(format!(
                "{} review {} ({} like(s))",
                verb,
                review.id,
                review.like_count()
            ));
            output.data(&review);
        }
        ReviewCommands::Show { review_id } => {
            let review = reviews.get_review(review_id).await?;
            output.human(render_reviews(std::slice::from_ref(&review)));
            output.human(&review.content);
            output.data(&review);
        }
        ReviewCommands::List {
            movie_id,
            sort,
            page,
            limit,
        } => {
            let page = reviews
                .list_reviews(movie_id, ReviewQuery { sort, page, limit })
                .await?;
            if page.items.is_empty() {
                output.info("No reviews found");
            } else {
                output.human(render_reviews(&page.items));
                output.human(format!(
                    "Page {} of {} ({} review(s))",
                    page.current_page, page.total_pages, page.total
                ));
            }
            output.data(&json!({
                "reviews": page.items,
                "total": page.total,
                "totalPages": page.total_pages,
                "currentPage": page.current_page,
            }));
        }
    }

    Ok(())
}

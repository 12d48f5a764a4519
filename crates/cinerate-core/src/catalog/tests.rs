use super::*;
use crate::import::parse_movies_reader;
use crate::reviews::ReviewService;
use crate::test_support::{draft, FailingStore};
use cinerate_models::{ReviewDraft, UserId};
use cinerate_store::MemoryStore;
use futures::future::join_all;

struct Fixture {
    store: Arc<dyn DocumentStore>,
    catalog: CatalogService,
    reviews: ReviewService,
}

fn fixture() -> Fixture {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let locks = Arc::new(MovieLocks::new());
    Fixture {
        catalog: CatalogService::new(store.clone(), locks.clone(), CatalogConfig::default()),
        reviews: ReviewService::new(store.clone(), locks),
        store,
    }
}

fn movie_draft(title: &str, genre: &str, year: i32) -> MovieDraft {
    MovieDraft {
        genre: genre.to_string(),
        release_year: year,
        ..draft(title)
    }
}

#[tokio::test]
async fn test_create_movie_validates() {
    let f = fixture();

    let movie = f.catalog.create_movie(draft("Heat")).await.unwrap();
    assert_eq!(movie.total_ratings, 0);
    assert_eq!(f.catalog.get_movie(movie.id).await.unwrap().title, "Heat");

    let mut bad = draft("Too Early");
    bad.release_year = 1850;
    let err = f.catalog.create_movie(bad).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(f.store.list_movies().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_edit_preserves_aggregate_and_links() {
    let f = fixture();
    let movie = f.catalog.create_movie(draft("Heat")).await.unwrap();
    let review = f
        .reviews
        .create_review(movie.id, UserId::new("alice"), ReviewDraft::new(5, "Best shootout ever filmed"))
        .await
        .unwrap();

    let mut edit = movie.to_draft();
    edit.title = "Heat (1995)".to_string();
    let edited = f.catalog.update_movie(movie.id, edit).await.unwrap();

    assert_eq!(edited.title, "Heat (1995)");
    assert_eq!(edited.total_ratings, 1);
    assert_eq!(edited.average_rating, 5.0);
    assert!(edited.reviews.contains(&review.id));

    let err = f.catalog.update_movie(MovieId::new(), draft("Ghost")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_edits_do_not_clobber_aggregate() {
    let f = fixture();
    let movie = f.catalog.create_movie(draft("Heat")).await.unwrap();

    let creates = join_all((0..10).map(|i| {
        f.reviews.create_review(
            movie.id,
            UserId::new(format!("user{}", i)),
            ReviewDraft::new(4, "Tense from start to finish"),
        )
    }));
    let edits = join_all((0..10).map(|i| {
        let mut edit = movie.to_draft();
        edit.description = format!("Revision {}", i);
        f.catalog.update_movie(movie.id, edit)
    }));
    let (created, edited) = tokio::join!(creates, edits);
    assert!(created.iter().all(|r| r.is_ok()));
    assert!(edited.iter().all(|r| r.is_ok()));

    let stored = f.catalog.get_movie(movie.id).await.unwrap();
    assert_eq!(stored.total_ratings, 10);
    assert_eq!(stored.reviews.len(), 10);
    assert_eq!(stored.average_rating, 4.0);
}

#[tokio::test]
async fn test_delete_cascades_reviews() {
    let f = fixture();
    let doomed = f.catalog.create_movie(draft("Doomed")).await.unwrap();
    let kept = f.catalog.create_movie(draft("Kept")).await.unwrap();
    for user in ["alice", "bob"] {
        f.reviews
            .create_review(doomed.id, UserId::new(user), ReviewDraft::new(3, "Fine for a rainy day"))
            .await
            .unwrap();
    }
    f.reviews
        .create_review(kept.id, UserId::new("alice"), ReviewDraft::new(4, "Holds up on rewatch"))
        .await
        .unwrap();

    let removal = f.catalog.delete_movie(doomed.id).await.unwrap();
    assert_eq!(removal.reviews_removed, 2);
    assert_eq!(removal.reviews_left, 0);
    assert_eq!(removal.movie.id, doomed.id);

    assert!(f.catalog.get_movie(doomed.id).await.unwrap_err().is_not_found());
    assert!(f.store.reviews_for_movie(&doomed.id).await.unwrap().is_empty());
    assert_eq!(f.store.list_reviews().await.unwrap().len(), 1);

    // Reviews can no longer be written against it
    let err = f
        .reviews
        .create_review(doomed.id, UserId::new("carol"), ReviewDraft::new(3, "Too late for this"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    assert!(f.catalog.delete_movie(doomed.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_details_lists_reviews() {
    let f = fixture();
    let movie = f.catalog.create_movie(draft("Heat")).await.unwrap();
    let review = f
        .reviews
        .create_review(movie.id, UserId::new("alice"), ReviewDraft::new(4, "Great heist picture"))
        .await
        .unwrap();

    let details = f.catalog.movie_details(movie.id).await.unwrap();
    assert_eq!(details.movie.id, movie.id);
    assert_eq!(details.reviews.len(), 1);
    assert_eq!(details.reviews[0].id, review.id);

    let json = serde_json::to_value(&details).unwrap();
    assert_eq!(json["movie"]["totalRatings"], 1);
    assert_eq!(json["reviews"][0]["rating"], 4);
}

#[tokio::test]
async fn test_list_filter_sort_and_paginate() {
    let f = fixture();
    f.catalog.create_movie(movie_draft("beta", "Drama", 2001)).await.unwrap();
    let alpha = f.catalog.create_movie(movie_draft("Alpha", "Drama", 2010)).await.unwrap();
    f.catalog.create_movie(movie_draft("Gamma", "Comedy", 1999)).await.unwrap();
    f.reviews
        .create_review(alpha.id, UserId::new("alice"), ReviewDraft::new(5, "Top of the pile"))
        .await
        .unwrap();

    let titles = |page: &Page<Movie>| page.items.iter().map(|m| m.title.clone()).collect::<Vec<_>>();

    let by_title = f
        .catalog
        .list_movies(MovieQuery {
            sort: MovieSort::Title,
            page: 1,
            ..MovieQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(titles(&by_title), vec!["Alpha", "beta", "Gamma"]);

    let by_year = f
        .catalog
        .list_movies(MovieQuery {
            sort: MovieSort::Year,
            page: 1,
            ..MovieQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(titles(&by_year), vec!["Alpha", "beta", "Gamma"]);

    let by_rating = f
        .catalog
        .list_movies(MovieQuery {
            sort: MovieSort::Rating,
            page: 1,
            ..MovieQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_rating.items[0].title, "Alpha");

    let dramas = f
        .catalog
        .list_movies(MovieQuery {
            genre: Some("Drama".to_string()),
            sort: MovieSort::Title,
            page: 2,
            limit: Some(1),
        })
        .await
        .unwrap();
    assert_eq!(dramas.total, 2);
    assert_eq!(dramas.total_pages, 2);
    assert_eq!(dramas.current_page, 2);
    assert_eq!(titles(&dramas), vec!["beta"]);

    // Genre filter is an exact match
    let none = f
        .catalog
        .list_movies(MovieQuery {
            genre: Some("drama".to_string()),
            ..MovieQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(none.total, 0);
}

#[tokio::test]
async fn test_genres_and_by_genre() {
    let f = fixture();
    f.catalog.create_movie(movie_draft("Zed", "Drama", 2001)).await.unwrap();
    f.catalog.create_movie(movie_draft("Amy", "Drama", 2002)).await.unwrap();
    f.catalog.create_movie(movie_draft("Ha", "Comedy", 2003)).await.unwrap();

    assert_eq!(f.catalog.genres().await.unwrap(), vec!["Comedy", "Drama"]);

    let dramas = f.catalog.movies_by_genre("Drama").await.unwrap();
    assert_eq!(dramas.iter().map(|m| m.title.as_str()).collect::<Vec<_>>(), vec!["Amy", "Zed"]);
}

#[test]
fn test_movie_sort_from_str() {
    assert_eq!("Rating".parse::<MovieSort>().unwrap(), MovieSort::Rating);
    assert_eq!(MovieSort::default(), MovieSort::Newest);
    assert!("random".parse::<MovieSort>().is_err());
}

#[tokio::test]
async fn test_import_skips_invalid_rows() {
    let f = fixture();
    let csv = "\
title,description,year,genre,director,cast,poster_url
Heat,Cops and robbers,1995,Crime,Michael Mann,Al Pacino|Robert De Niro,https://example.com/heat.jpg
,No title here,2000,Crime,Someone,,https://example.com/x.jpg
Broken,Bad year,soon,Crime,Nobody,,https://example.com/b.jpg
Up,Balloons,2009,Animation,Pete Docter,,not-a-url
";
    let rows = parse_movies_reader(csv.as_bytes()).unwrap();

    let mut progress = Vec::new();
    let report = f.catalog.import(rows, |done| progress.push(done)).await.unwrap();

    assert_eq!(report.created.len(), 1);
    assert_eq!(
        report.skipped.iter().map(|s| s.line).collect::<Vec<_>>(),
        vec![3, 4, 5]
    );
    assert!(report.skipped[0].reason.contains("title"));
    assert!(report.skipped[2].reason.contains("posterUrl"));
    assert_eq!(progress, vec![1, 2, 3, 4]);

    let heat = f.catalog.get_movie(report.created[0]).await.unwrap();
    assert_eq!(heat.cast, vec!["Al Pacino", "Robert De Niro"]);
}

#[tokio::test]
async fn test_seed_skips_existing_and_resets() {
    let f = fixture();
    let drafts = vec![draft("Heat"), draft("Arrival")];

    f.catalog.create_movie(draft("heat")).await.unwrap();
    let report = f.catalog.seed(drafts.clone(), false).await.unwrap();
    assert_eq!(
        report,
        SeedReport {
            cleared: false,
            created: 1,
            already_present: 1,
        }
    );

    let movie = f.store.list_movies().await.unwrap()[0].clone();
    f.reviews
        .create_review(movie.id, UserId::new("alice"), ReviewDraft::new(2, "Wiped by the reset"))
        .await
        .unwrap();

    let report = f.catalog.seed(drafts, true).await.unwrap();
    assert!(report.cleared);
    assert_eq!(report.created, 2);
    assert_eq!(f.store.list_movies().await.unwrap().len(), 2);
    assert!(f.store.list_reviews().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_succeeds_when_reviews_cannot_be_removed() {
    let failing = Arc::new(FailingStore::new());
    let locks = Arc::new(MovieLocks::new());
    let catalog = CatalogService::new(failing.clone(), locks.clone(), CatalogConfig::default());
    let reviews = ReviewService::new(failing.clone(), locks.clone());

    let movie = catalog.create_movie(draft("Doomed")).await.unwrap();
    for user in ["alice", "bob"] {
        reviews
            .create_review(movie.id, UserId::new(user), ReviewDraft::new(2, "Not one for the ages"))
            .await
            .unwrap();
    }

    failing.fail_review_writes(true);
    let removal = catalog.delete_movie(movie.id).await.unwrap();
    assert_eq!(removal.reviews_removed, 0);
    assert_eq!(removal.reviews_left, 2);
    assert!(catalog.get_movie(movie.id).await.unwrap_err().is_not_found());

    failing.fail_review_writes(false);
    let report = reviews.aggregator().reconcile_all(&locks).await.unwrap();
    assert_eq!(report.orphaned_reviews_removed, 2);
    assert!(failing.list_reviews().await.unwrap().is_empty());
}

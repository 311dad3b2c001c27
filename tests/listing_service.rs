mod support;

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use annonces::application::listings::{CacheOutcome, ListingError};
use annonces::application::query::{ListingScope, QueryError, RawParams};
use annonces::domain::listings::ListingPatch;
use annonces::domain::types::{ListingStatus, PriceType};

use support::{InMemoryListings, draft, listing, seller, service};

fn params(pairs: &[(&str, &str)]) -> RawParams {
    RawParams::from_pairs(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())))
}

async fn seed_vehicles(repo: &InMemoryListings) -> Uuid {
    let fixed = repo
        .insert(
            listing("Toyota RAV4 2019")
                .priced(PriceType::Fixed, Some(5000.0))
                .build(),
        )
        .await;
    repo.insert(
        listing("Pick-up Hilux")
            .priced(PriceType::Negotiable, Some(20000.0))
            .build(),
    )
    .await;
    repo.insert(listing("Carcasse à donner").priced(PriceType::Free, None).build())
        .await;
    repo.insert(
        listing("Location Prado")
            .priced(PriceType::OnRequest, None)
            .build(),
    )
    .await;
    fixed.id
}

#[tokio::test]
async fn repeated_public_search_is_served_from_cache() {
    let repo = InMemoryListings::new();
    seed_vehicles(&repo).await;
    let service = service(&repo);

    let first = service
        .search(&params(&[("category", "vehicules")]), ListingScope::Public)
        .await
        .expect("first search");
    assert_eq!(first.outcome, CacheOutcome::Miss);
    let reads_after_first = repo.reads();
    assert!(reads_after_first > 0);

    let second = service
        .search(&params(&[("category", "vehicules")]), ListingScope::Public)
        .await
        .expect("second search");
    assert!(second.is_hit());
    assert!(Arc::ptr_eq(&first.value, &second.value));
    assert_eq!(repo.reads(), reads_after_first, "cache hit must not touch the store");
}

#[tokio::test]
async fn parameter_order_does_not_split_the_cache() {
    let repo = InMemoryListings::new();
    seed_vehicles(&repo).await;
    let service = service(&repo);

    service
        .search(
            &params(&[("city", "Gombe"), ("category", "vehicules")]),
            ListingScope::Public,
        )
        .await
        .expect("search");
    let reordered = service
        .search(
            &params(&[("category", "vehicules"), ("city", "Gombe")]),
            ListingScope::Public,
        )
        .await
        .expect("search");
    assert!(reordered.is_hit());
}

#[tokio::test]
async fn price_range_keeps_priced_listings_within_bounds() {
    let repo = InMemoryListings::new();
    let fixed_id = seed_vehicles(&repo).await;
    let service = service(&repo);

    let page = service
        .search(
            &params(&[("category", "vehicules"), ("min", "1000"), ("max", "10000")]),
            ListingScope::Public,
        )
        .await
        .expect("search");
    let ids: Vec<Uuid> = page.value.items.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![fixed_id]);
    assert_eq!(page.value.total, 1);

    let cheap = service
        .search(&params(&[("max", "100")]), ListingScope::Public)
        .await
        .expect("search");
    assert!(cheap.value.items.is_empty(), "unpriced listings never match a bound");
    assert_eq!(cheap.value.total, 0);
}

#[tokio::test]
async fn price_bound_overrides_unpriced_price_type() {
    let repo = InMemoryListings::new();
    seed_vehicles(&repo).await;
    let service = service(&repo);

    let page = service
        .search(
            &params(&[("priceType", "free"), ("min", "10")]),
            ListingScope::Public,
        )
        .await
        .expect("search");
    assert_eq!(page.value.total, 2);
    assert!(page.value.items.iter().all(|item| matches!(
        item.price_type,
        PriceType::Fixed | PriceType::Negotiable
    )));

    let free = service
        .search(&params(&[("priceType", "free")]), ListingScope::Public)
        .await
        .expect("search");
    assert_eq!(free.value.total, 1);
    assert_eq!(free.value.items[0].price_type, PriceType::Free);
}

#[tokio::test]
async fn unknown_price_type_is_rejected() {
    let repo = InMemoryListings::new();
    let service = service(&repo);

    let err = service
        .search(&params(&[("priceType", "barter")]), ListingScope::Public)
        .await
        .expect_err("unknown price type");
    assert!(matches!(
        err,
        ListingError::Query(QueryError::InvalidPriceType(ref value)) if value == "barter"
    ));
}

#[tokio::test]
async fn page_size_is_capped() {
    let repo = InMemoryListings::new();
    for i in 0..60 {
        repo.insert(listing(&format!("Annonce {i}")).build()).await;
    }
    let service = service(&repo);

    let page = service
        .search(&params(&[("limit", "500")]), ListingScope::Public)
        .await
        .expect("search");
    assert_eq!(page.value.limit, 50);
    assert_eq!(page.value.items.len(), 50);
    assert_eq!(page.value.total, 60);
    assert_eq!(page.value.pages, 2);

    let second = service
        .search(
            &params(&[("limit", "500"), ("page", "2")]),
            ListingScope::Public,
        )
        .await
        .expect("search");
    assert_eq!(second.value.items.len(), 10);
}

#[tokio::test]
async fn newest_first_and_price_sorts() {
    let repo = InMemoryListings::new();
    seed_vehicles(&repo).await;
    let service = service(&repo);

    let newest = service
        .search(&params(&[]), ListingScope::Public)
        .await
        .expect("search");
    let titles: Vec<&str> = newest
        .value
        .items
        .iter()
        .map(|item| item.title.as_str())
        .collect();
    assert_eq!(titles[0], "Location Prado");
    assert_eq!(titles[3], "Toyota RAV4 2019");

    let cheapest = service
        .search(&params(&[("sort", "price_asc")]), ListingScope::Public)
        .await
        .expect("search");
    let prices: Vec<Option<f64>> = cheapest.value.items.iter().map(|item| item.price).collect();
    assert_eq!(&prices[..2], &[Some(5000.0), Some(20000.0)]);
    assert!(prices[2..].iter().all(Option::is_none), "unpriced listings sort last");
}

#[tokio::test]
async fn facets_follow_the_filtered_result_set() {
    let repo = InMemoryListings::new();
    repo.insert(listing("Corolla").delivery().build()).await;
    repo.insert(listing("Yaris").build()).await;
    repo.insert(
        listing("Honda CBR")
            .category("vehicules", Some("motos"))
            .delivery()
            .build(),
    )
    .await;
    repo.insert(
        listing("Frigo")
            .category("maison", Some("electromenager"))
            .build(),
    )
    .await;
    let service = service(&repo);

    let page = service
        .search(&params(&[("category", "vehicules")]), ListingScope::Public)
        .await
        .expect("search");
    let facets = &page.value.facets;
    let subs: Vec<(&str, u64)> = facets
        .sub_categories
        .iter()
        .map(|facet| (facet.value.as_str(), facet.count))
        .collect();
    assert_eq!(subs, vec![("voitures", 2), ("motos", 1)]);
    assert_eq!(facets.delivery_available, 2);
}

#[tokio::test]
async fn attribute_and_text_filters_combine() {
    let repo = InMemoryListings::new();
    let diesel = repo
        .insert(
            listing("Toyota Hilux")
                .description("Moteur diesel, climatisation")
                .attribute("fuel", "diesel")
                .attribute("year", 2019.0)
                .build(),
        )
        .await;
    repo.insert(
        listing("Toyota Vitz")
            .attribute("fuel", "essence")
            .attribute("year", 2019.0)
            .build(),
    )
    .await;
    let service = service(&repo);

    let page = service
        .search(
            &params(&[("q", "toyota"), ("attr_fuel", "diesel"), ("attr_year", "2019")]),
            ListingScope::Public,
        )
        .await
        .expect("search");
    assert_eq!(page.value.total, 1);
    assert_eq!(page.value.items[0].id, diesel.id);
}

#[tokio::test]
async fn create_invalidates_cached_searches() {
    let repo = InMemoryListings::new();
    seed_vehicles(&repo).await;
    let service = service(&repo);

    let before = service
        .search(&params(&[]), ListingScope::Public)
        .await
        .expect("search");
    assert_eq!(before.value.total, 4);

    let created = service
        .create_listing(
            Uuid::new_v4(),
            draft("Mercedes C200", PriceType::Fixed, Some(12000.0)),
        )
        .await
        .expect("create");

    let after = service
        .search(&params(&[]), ListingScope::Public)
        .await
        .expect("search");
    assert_eq!(after.outcome, CacheOutcome::Miss);
    assert_eq!(after.value.total, 5);
    assert!(after.value.items.iter().any(|item| item.id == created.id));
}

#[tokio::test]
async fn invalid_draft_is_not_persisted() {
    let repo = InMemoryListings::new();
    let service = service(&repo);

    let err = service
        .create_listing(Uuid::new_v4(), draft("Sans prix", PriceType::Fixed, None))
        .await
        .expect_err("fixed price requires an amount");
    assert!(matches!(err, ListingError::Domain(_)));

    let page = service
        .search(&params(&[]), ListingScope::Public)
        .await
        .expect("search");
    assert_eq!(page.value.total, 0);
}

#[tokio::test]
async fn single_read_redacts_hidden_phone() {
    let repo = InMemoryListings::new();
    let private = seller(false, true);
    let public = seller(true, true);
    repo.add_seller(private.clone()).await;
    repo.add_seller(public.clone()).await;
    let hidden = repo
        .insert(listing("Canapé").seller(private.id).build())
        .await;
    let shown = repo.insert(listing("Table").seller(public.id).build()).await;
    let service = service(&repo);

    let detail = service.get_by_id(hidden.id).await.expect("listing");
    let contact = detail.value.seller.as_ref().expect("seller");
    assert_eq!(contact.phone, None);
    assert_eq!(contact.whatsapp, None);
    assert_eq!(contact.email, private.email);

    let cached = service.get_by_id(hidden.id).await.expect("listing");
    assert!(cached.is_hit());
    assert_eq!(cached.value.seller.as_ref().and_then(|s| s.phone.clone()), None);

    let detail = service.get_by_id(shown.id).await.expect("listing");
    assert_eq!(
        detail.value.seller.as_ref().and_then(|s| s.phone.clone()),
        public.phone
    );
}

#[tokio::test]
async fn single_read_returns_any_status() {
    let repo = InMemoryListings::new();
    let sold = repo
        .insert(listing("Vendu").status(ListingStatus::Sold).build())
        .await;
    let service = service(&repo);

    let detail = service.get_by_id(sold.id).await.expect("listing");
    assert_eq!(detail.value.listing.status, ListingStatus::Sold);

    let missing = Uuid::new_v4();
    let err = service.get_by_id(missing).await.expect_err("missing");
    assert!(matches!(err, ListingError::NotFound(id) if id == missing));
}

#[tokio::test(start_paused = true)]
async fn cached_search_expires_after_ttl() {
    let repo = InMemoryListings::new();
    seed_vehicles(&repo).await;
    let service = service(&repo);
    let raw = params(&[("province", "Kinshasa")]);

    service.search(&raw, ListingScope::Public).await.expect("search");

    tokio::time::advance(Duration::from_secs(89)).await;
    let warm = service.search(&raw, ListingScope::Public).await.expect("search");
    assert!(warm.is_hit());

    tokio::time::advance(Duration::from_secs(2)).await;
    let cold = service.search(&raw, ListingScope::Public).await.expect("search");
    assert_eq!(cold.outcome, CacheOutcome::Miss);
}

#[tokio::test]
async fn update_invalidates_listing_and_similar_entries() {
    let repo = InMemoryListings::new();
    let anchor = repo.insert(listing("Corolla").build()).await;
    repo.insert(listing("Yaris").build()).await;
    let service = service(&repo);

    service.get_by_id(anchor.id).await.expect("listing");
    service.similar(anchor.id, None).await.expect("similar");
    service.similar(anchor.id, Some(3)).await.expect("similar");
    assert!(service.get_by_id(anchor.id).await.expect("listing").is_hit());

    let patch = ListingPatch {
        title: Some("Corolla 2015".to_string()),
        ..ListingPatch::default()
    };
    let updated = service
        .update_listing(anchor.id, patch)
        .await
        .expect("update");
    assert_eq!(updated.title, "Corolla 2015");
    assert_eq!(updated.price, anchor.price);

    let detail = service.get_by_id(anchor.id).await.expect("listing");
    assert_eq!(detail.outcome, CacheOutcome::Miss);
    assert_eq!(detail.value.listing.title, "Corolla 2015");
    assert!(!service.similar(anchor.id, None).await.expect("similar").is_hit());
    assert!(!service.similar(anchor.id, Some(3)).await.expect("similar").is_hit());
}

#[tokio::test]
async fn status_change_hides_listing_from_public_search() {
    let repo = InMemoryListings::new();
    let target = repo.insert(listing("Corolla").build()).await;
    repo.insert(listing("Yaris").build()).await;
    let service = service(&repo);

    let before = service
        .search(&params(&[]), ListingScope::Public)
        .await
        .expect("search");
    assert_eq!(before.value.total, 2);

    service
        .set_status(target.id, ListingStatus::Sold)
        .await
        .expect("status");

    let after = service
        .search(&params(&[]), ListingScope::Public)
        .await
        .expect("search");
    assert_eq!(after.outcome, CacheOutcome::Miss);
    assert_eq!(after.value.total, 1);

    let err = service
        .set_status(Uuid::new_v4(), ListingStatus::Sold)
        .await
        .expect_err("missing");
    assert!(matches!(err, ListingError::NotFound(_)));
}

#[tokio::test]
async fn delete_removes_listing_everywhere() {
    let repo = InMemoryListings::new();
    let target = repo.insert(listing("Corolla").build()).await;
    let service = service(&repo);

    service.get_by_id(target.id).await.expect("listing");
    service.delete_listing(target.id).await.expect("delete");

    let err = service.get_by_id(target.id).await.expect_err("deleted");
    assert!(matches!(err, ListingError::NotFound(_)));

    let again = service.delete_listing(target.id).await.expect_err("gone");
    assert!(matches!(again, ListingError::NotFound(id) if id == target.id));
}

#[tokio::test]
async fn seller_scope_bypasses_cache_and_sees_every_status() {
    let repo = InMemoryListings::new();
    let owner = Uuid::new_v4();
    repo.insert(listing("Actif").seller(owner).build()).await;
    repo.insert(
        listing("En attente")
            .seller(owner)
            .status(ListingStatus::Pending)
            .build(),
    )
    .await;
    repo.insert(listing("Autre vendeur").seller(Uuid::new_v4()).build())
        .await;
    let service = service(&repo);

    for _ in 0..2 {
        let page = service
            .search(&params(&[]), ListingScope::Seller(owner))
            .await
            .expect("search");
        assert_eq!(page.outcome, CacheOutcome::Bypass);
        assert_eq!(page.value.total, 2);
        assert!(page.value.items.iter().all(|item| item.seller_id == owner));
    }
    assert!(service.cache().is_empty());

    let pending = service
        .search(&params(&[("status", "pending")]), ListingScope::Seller(owner))
        .await
        .expect("search");
    assert_eq!(pending.value.total, 1);
}

#[tokio::test]
async fn store_failure_is_not_cached() {
    let repo = InMemoryListings::new();
    seed_vehicles(&repo).await;
    let service = service(&repo);

    repo.set_failing(true);
    let err = service
        .search(&params(&[]), ListingScope::Public)
        .await
        .expect_err("store down");
    assert!(matches!(err, ListingError::Repo(_)));
    assert!(service.cache().is_empty());

    repo.set_failing(false);
    let page = service
        .search(&params(&[]), ListingScope::Public)
        .await
        .expect("search");
    assert_eq!(page.outcome, CacheOutcome::Miss);
    assert_eq!(page.value.total, 4);
}

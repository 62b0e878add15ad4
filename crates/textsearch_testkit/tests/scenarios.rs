//! End-to-end search scenarios over the sample posts.

use serde_json::{json, Value};
use textsearch_core::{
    EntityId, FieldValue, IndexDefinition, Query, SearchConfig, SearchError, SearchOptions,
    Searchable, SplitRule, TextSearch,
};
use textsearch_store::{IndexStore, StoreError};
use textsearch_testkit::prelude::*;

fn ids(search: &TextSearch<Value>, query: impl Into<Query>) -> Vec<String> {
    id_strings(&search.matching_ids(query).unwrap())
}

fn record_ids(records: &[Value]) -> Vec<u64> {
    records.iter().filter_map(|r| r["id"].as_u64()).collect()
}

#[test]
fn title_prefix_keys() {
    with_seeded_search(|t| {
        let keys = t.text_indexes_for(&1u64.into(), "title").unwrap();
        for key in ["so", "som", "some", "pl", "plain", "te", "text"] {
            assert!(keys.contains(&format!("post:text_index:title:{key}")), "missing {key}");
        }
        assert!(!keys.contains(&"post:text_index:title:s".to_string()));

        let keys = t.text_indexes_for(&2u64.into(), "title").unwrap();
        for key in ["te", "tex", "text", "texts", "textst", "textstr", "textstring"] {
            assert!(keys.contains(&format!("post:text_index:title:{key}")), "missing {key}");
        }
    });
}

#[test]
fn exact_tags_store_whole_words() {
    with_seeded_search(|t| {
        assert_eq!(
            t.text_indexes_for(&2u64.into(), "tags").unwrap(),
            vec!["post:text_index:tags:mysql", "post:text_index:tags:technical"]
        );
        let members = t.store.set_members("post:text_index:tags:technical").unwrap();
        assert_eq!(members.into_iter().collect::<Vec<_>>(), vec!["2", "3"]);
        assert!(t.store.set_members("post:text_index:tags:tech").unwrap().is_empty());
    });
}

#[test]
fn positional_searches() {
    with_seeded_search(|t| {
        assert_eq!(ids(t, "plain"), vec!["1", "2"]);
        assert_eq!(ids(t, "textstr"), vec!["2"]);
        assert_eq!(ids(t, "some"), vec!["1", "3"]);
        assert_eq!(ids(t, "comments"), vec!["2", "3"]);
        assert_eq!(ids(t, Query::terms(["some", "TExt"])), vec!["1"]);
        assert_eq!(ids(t, Query::terms(["plain", "textstr"])), vec!["2"]);
        assert_eq!(ids(t, Query::terms("PERsonal").in_fields(["tags"])), vec!["1"]);
        assert_eq!(ids(t, Query::terms("personal")), vec!["1", "3"]);
        assert!(ids(t, Query::terms("nontechnical").in_fields(["title"])).is_empty());
    });
}

#[test]
fn map_form_searches() {
    with_seeded_search(|t| {
        let q = Query::fields().field("tags", "technical").field("title", "plain");
        assert_eq!(ids(t, q), vec!["2"]);

        let q = Query::fields()
            .field("tags", ["technical", "MYsql"])
            .field("title", "Mo");
        assert_eq!(ids(t, q), vec!["2"]);

        let q = Query::fields()
            .field("tags", ["personal", "gaming"])
            .field("title", "some");
        assert_eq!(ids(t, q), vec!["1", "3"]);

        let q = Query::fields().field("tags", "nontechnical").field("title", "come");
        assert!(ids(t, q).is_empty());
    });
}

#[test]
fn search_returns_resolved_records() {
    with_seeded_search(|t| {
        let matches = t
            .search("technical", SearchOptions::new().order("id desc").select(["id", "title"]))
            .unwrap();
        assert_eq!(
            matches.records,
            vec![
                json!({"id": 3, "title": TITLES[2]}),
                json!({"id": 2, "title": TITLES[1]}),
            ]
        );
        assert_eq!(matches.pagination, None);
    });
}

#[test]
fn pagination_window() {
    with_seeded_search(|t| {
        let matches = t.search("plain", SearchOptions::new().page(2).per_page(1)).unwrap();
        let pagination = matches.pagination.unwrap();
        assert_eq!((pagination.offset, pagination.limit), (1, 1));
        assert_eq!(pagination.total_entries, 2);
        assert_eq!(pagination.total_pages(), 2);
        assert_eq!(record_ids(&matches.records), vec![2]);

        let (_, find) = &t.resolver.calls().finds[0];
        assert_eq!((find.offset, find.limit), (Some(1), Some(1)));
    });
}

#[test]
fn page_far_beyond_results_is_empty() {
    with_seeded_search(|t| {
        let matches = t
            .search("plain", SearchOptions::new().page(usize::MAX / 2).per_page(30))
            .unwrap();
        assert!(matches.is_empty());

        let pagination = matches.pagination.unwrap();
        assert_eq!(pagination.offset, usize::MAX);
        assert_eq!(pagination.total_entries, 2);
    });
}

#[test]
fn page_defaults_to_configured_size() {
    let test = TestSearch::with_config(&post_config().per_page(1), PostResolver::new(sample_posts()));
    test.index_all();

    let matches = test.search("plain", SearchOptions::new().page(0)).unwrap();
    let pagination = matches.pagination.unwrap();
    assert_eq!((pagination.page, pagination.offset, pagination.limit), (1, 0, 1));
    assert_eq!(record_ids(&matches.records), vec![1]);
}

#[test]
fn conditions_count_through_resolver() {
    with_seeded_search(|t| {
        let options = SearchOptions::new().page(1).condition("published", true);
        let matches = t.search("plain", options).unwrap();

        assert_eq!(record_ids(&matches.records), vec![1]);
        assert_eq!(matches.total_entries(), 1);

        let calls = t.resolver.calls();
        assert_eq!(calls.counts.len(), 1);
        let (ids, count_options) = &calls.counts[0];
        assert_eq!(ids.len(), 2);
        assert_eq!(count_options.offset, None);
        assert_eq!(count_options.limit, None);
    });
}

#[test]
fn conditions_without_count_fail() {
    let test = TestSearch::with_resolver(PostResolver::new(sample_posts()).without_count());
    test.index_all();

    let options = SearchOptions::new().page(1).condition("published", true);
    assert!(matches!(
        test.search("plain", options),
        Err(SearchError::Configuration { .. })
    ));
}

#[test]
fn empty_match_skips_resolver() {
    with_seeded_search(|t| {
        let matches = t.search("zebra", SearchOptions::new().page(3)).unwrap();
        assert!(matches.is_empty());
        assert_eq!(matches.total_entries(), 0);

        let matches = t.search(Query::terms(["plain", "gaming"]), SearchOptions::new()).unwrap();
        assert!(matches.is_empty());

        assert!(t.resolver.calls().is_empty());
    });
}

#[test]
fn query_errors() {
    with_seeded_search(|t| {
        let none: Vec<&str> = Vec::new();
        assert!(matches!(
            t.search(Query::terms(none), SearchOptions::new()),
            Err(SearchError::BadQuery { .. })
        ));
        assert!(matches!(
            t.search(Query::fields().field("body", "x"), SearchOptions::new()),
            Err(SearchError::UnknownField { field }) if field == "body"
        ));
        assert!(matches!(
            t.update_indexes(&1u64.into(), "body", "x"),
            Err(SearchError::UnknownField { .. })
        ));
    });
}

#[test]
fn resolver_errors_propagate() {
    with_seeded_search(|t| {
        let err = t
            .search("plain", SearchOptions::new().order("id sideways"))
            .unwrap_err();
        assert!(matches!(err, SearchError::Resolver(_)));
    });
}

#[test]
fn store_errors_propagate() {
    let search = TextSearch::<()>::new(&post_config(), FailingStore).unwrap();

    let err = search.update_indexes(&1u64.into(), "title", "plain").unwrap_err();
    assert!(matches!(err, SearchError::Store(StoreError::Connection(_))));

    let err = search.matching_ids("plain").unwrap_err();
    assert!(matches!(err, SearchError::Store(_)));
}

#[test]
fn editing_and_deleting_posts() {
    with_seeded_search(|t| {
        let mut post = sample_posts().remove(1);
        post.title = "Less plain".to_string();
        t.store.reset_stats();
        t.update_entity(&post).unwrap();

        // tags are unchanged, so only title's reverse map read and one batch
        let stats = t.store.stats();
        assert_eq!(stats.round_trips, 3);
        assert!(ids(t, "textstr").is_empty());
        assert_eq!(ids(t, "less"), vec!["2"]);
        assert_eq!(ids(t, "plain"), vec!["1", "2"]);

        t.delete_entity(&post).unwrap();
        assert_eq!(ids(t, "plain"), vec!["1"]);
        assert!(t.text_indexes(&post.search_id()).unwrap().is_empty());
        assert!(t.store.keys_with_prefix("post:2:").is_empty());
        assert!(t.store.set_members("post:text_index:tags:mysql").unwrap().is_empty());
    });
}

#[test]
fn missing_field_value_withdraws_keys() {
    with_seeded_search(|t| {
        let mut post = sample_posts().remove(0);
        post.tags.clear();
        t.update_entity(&post).unwrap();

        assert!(t.text_indexes_for(&post.search_id(), "tags").unwrap().is_empty());
        assert!(ids(t, Query::terms("personal").in_fields(["tags"])).is_empty());
    });
}

#[test]
fn full_mode_matches_phrase_prefixes() {
    let config = SearchConfig::new("Post").index(IndexDefinition::new("title").full());
    let test = TestSearch::with_config(&config, PostResolver::new(sample_posts()));
    test.index_all();

    assert_eq!(ids(&test, Query::fields().field("title", "Some plain t")), vec!["1"]);
    assert_eq!(ids(&test, Query::fields().field("title", "more plain")), vec!["2"]);
    assert!(ids(&test, Query::fields().field("title", "plain text")).is_empty());
    assert_eq!(ids(&test, "plain"), vec!["1", "2"]);
}

#[test]
fn pattern_split_and_excludes() {
    let config = SearchConfig::new("Article")
        .exclude("mysql")
        .index(
            IndexDefinition::new("keywords")
                .split(SplitRule::pattern(r"\s*,\s*").unwrap())
                .exact(),
        );
    let search = TextSearch::<()>::new(&config, textsearch_store::InMemoryStore::new()).unwrap();
    let id = EntityId::from("intro-to-sql");

    assert!(search
        .update_indexes(&id, "keywords", "Relational Databases, MySQL, joins")
        .unwrap());
    assert_eq!(
        search.text_indexes_for(&id, "keywords").unwrap(),
        vec![
            "article:text_index:keywords:relational.databases",
            "article:text_index:keywords:joins",
        ]
    );
    assert_eq!(
        id_strings(&search.matching_ids(Query::terms("relational databases")).unwrap()),
        vec!["intro-to-sql"]
    );
}

#[test]
fn config_loaded_from_json() {
    let config: SearchConfig = serde_json::from_str(
        r#"{
            "entity_type": "blog::Post",
            "indexes": [
                {"field": "title"},
                {"field": "tags", "exact": true}
            ],
            "per_page": 2
        }"#,
    )
    .unwrap();
    let test = TestSearch::with_config(&config, PostResolver::new(sample_posts()));
    test.index_all();

    assert_eq!(test.default_per_page(), 2);
    assert_eq!(ids(&test, Query::fields().field("tags", "gaming")), vec!["3"]);
    assert!(test.store.contains_key("post:text_index:tags:gaming"));
}

#[test]
fn phrase_values_are_not_split() {
    let search = TextSearch::<()>::new(&post_config(), textsearch_store::InMemoryStore::new()).unwrap();
    let id = EntityId::from(7u64);

    search
        .update_indexes(&id, "tags", FieldValue::Phrases(vec!["Ruby on Rails".to_string()]))
        .unwrap();
    assert_eq!(
        search.text_indexes_for(&id, "tags").unwrap(),
        vec!["post:text_index:tags:ruby.on.rails"]
    );
    assert_eq!(
        id_strings(&search.matching_ids(Query::terms("ruby on rails").in_fields(["tags"])).unwrap()),
        vec!["7"]
    );
}

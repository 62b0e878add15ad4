//! Test fixtures and search helpers.
//!
//! Provides a sample `Post` entity, a vector-backed record resolver that
//! honors pass-through options, and a store that always fails.

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::Arc;
use textsearch_core::{
    EntityId, FieldValue, FindOptions, IndexDefinition, RecordResolver, ResolverError,
    SearchConfig, Searchable, TextSearch,
};
use textsearch_store::{Batch, InMemoryStore, IndexStore, MemberSet, StoreError, StoreResult};

/// Titles of the sample posts, by ID 1..=3.
pub const TITLES: [&str; 3] = [
    "Some plain text",
    "More plain textstring comments",
    "Come get somebody personal comments",
];

/// A blog post with a free-text title and a list of tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// Post ID.
    pub id: u64,
    /// Title, prefix indexed.
    pub title: String,
    /// Tags, exact indexed.
    pub tags: Vec<String>,
    /// Publication flag, used as a non-index filter.
    pub published: bool,
}

impl Post {
    /// Creates a published post.
    pub fn new(id: u64, title: &str, tags: &[&str]) -> Self {
        Self {
            id,
            title: title.to_string(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            published: true,
        }
    }

    /// Marks the post unpublished.
    pub fn unpublished(mut self) -> Self {
        self.published = false;
        self
    }

    /// Converts the post to the JSON record the resolver returns.
    pub fn to_record(&self) -> Value {
        serde_json::to_value(self).expect("post serializes")
    }
}

impl Searchable for Post {
    fn search_id(&self) -> EntityId {
        EntityId::from(self.id)
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "title" => Some(FieldValue::from(self.title.as_str())),
            "tags" if !self.tags.is_empty() => Some(FieldValue::Phrases(self.tags.clone())),
            _ => None,
        }
    }
}

/// The three sample posts.
///
/// Post 2 is unpublished so condition filters have something to drop.
pub fn sample_posts() -> Vec<Post> {
    vec![
        Post::new(1, TITLES[0], &["personal", "nontechnical"]),
        Post::new(2, TITLES[1], &["mysql", "technical"]).unpublished(),
        Post::new(3, TITLES[2], &["gaming", "technical"]),
    ]
}

/// Search configuration for posts: prefix-indexed titles and exact tags.
pub fn post_config() -> SearchConfig {
    SearchConfig::new("Post")
        .index(IndexDefinition::new("title"))
        .index(IndexDefinition::new("tags").exact())
}

/// Calls observed by a [`PostResolver`].
#[derive(Debug, Clone, Default)]
pub struct ResolverCalls {
    /// Arguments of every `find` call.
    pub finds: Vec<(Vec<EntityId>, FindOptions)>,
    /// Arguments of every `count` call.
    pub counts: Vec<(Vec<EntityId>, FindOptions)>,
}

impl ResolverCalls {
    /// Returns true if the resolver was never called.
    pub fn is_empty(&self) -> bool {
        self.finds.is_empty() && self.counts.is_empty()
    }
}

/// A resolver over an in-memory list of posts.
///
/// Records are returned as JSON objects so `select` can project them.
/// Clones share the post list and the call log.
#[derive(Debug, Clone)]
pub struct PostResolver {
    posts: Arc<Vec<Post>>,
    calls: Arc<Mutex<ResolverCalls>>,
    counting: bool,
}

impl PostResolver {
    /// Creates a resolver that supports counting.
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts: Arc::new(posts),
            calls: Arc::new(Mutex::new(ResolverCalls::default())),
            counting: true,
        }
    }

    /// Disables counting, as for a data source without `COUNT`.
    pub fn without_count(mut self) -> Self {
        self.counting = false;
        self
    }

    /// Returns a snapshot of the calls made so far.
    pub fn calls(&self) -> ResolverCalls {
        self.calls.lock().clone()
    }

    fn filtered(&self, ids: &[EntityId], options: &FindOptions) -> Vec<Value> {
        self.posts
            .iter()
            .filter(|post| ids.contains(&post.search_id()))
            .map(Post::to_record)
            .filter(|record| {
                options
                    .conditions
                    .iter()
                    .all(|(field, expected)| record.get(field) == Some(expected))
            })
            .collect()
    }
}

impl RecordResolver for PostResolver {
    type Record = Value;

    fn find(&self, ids: &[EntityId], options: &FindOptions) -> Result<Vec<Value>, ResolverError> {
        self.calls.lock().finds.push((ids.to_vec(), options.clone()));

        let mut records = self.filtered(ids, options);
        if let Some(order) = &options.order {
            let (field, descending) = parse_order(order)?;
            records.sort_by(|a, b| {
                let ord = compare_values(a.get(field), b.get(field));
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        let records = records
            .into_iter()
            .skip(options.offset.unwrap_or(0))
            .take(options.limit.unwrap_or(usize::MAX));

        Ok(match &options.select {
            Some(fields) => records.map(|r| project(&r, fields)).collect(),
            None => records.collect(),
        })
    }

    fn count(&self, ids: &[EntityId], options: &FindOptions) -> Result<Option<usize>, ResolverError> {
        self.calls.lock().counts.push((ids.to_vec(), options.clone()));
        if !self.counting {
            return Ok(None);
        }
        Ok(Some(self.filtered(ids, options).len()))
    }
}

fn parse_order(order: &str) -> Result<(&str, bool), ResolverError> {
    let mut parts = order.split_whitespace();
    let field = parts.next().ok_or("empty order clause")?;
    match parts.next().map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") => Ok((field, false)),
        Some("desc") => Ok((field, true)),
        Some(other) => Err(format!("unsupported order direction `{other}`").into()),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

fn project(record: &Value, fields: &[String]) -> Value {
    let mut out = Map::new();
    for field in fields {
        if let Some(value) = record.get(field) {
            out.insert(field.clone(), value.clone());
        }
    }
    Value::Object(out)
}

/// A store whose every operation fails with a connection error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

impl FailingStore {
    fn fail<T>() -> StoreResult<T> {
        Err(StoreError::Connection("connection refused".to_string()))
    }
}

impl IndexStore for FailingStore {
    fn set_members(&self, _key: &str) -> StoreResult<MemberSet> {
        Self::fail()
    }

    fn get_string(&self, _key: &str) -> StoreResult<Option<String>> {
        Self::fail()
    }

    fn set_string(&self, _key: &str, _value: &str) -> StoreResult<()> {
        Self::fail()
    }

    fn delete(&self, _key: &str) -> StoreResult<()> {
        Self::fail()
    }

    fn execute(&self, _batch: Batch) -> StoreResult<()> {
        Self::fail()
    }
}

/// A post search over a shared in-memory store, with handles to inspect it.
pub struct TestSearch {
    /// The search facade.
    pub search: TextSearch<Value>,
    /// The store the indexes live in.
    pub store: Arc<InMemoryStore>,
    /// The resolver, sharing its call log with the one inside `search`.
    pub resolver: PostResolver,
}

impl TestSearch {
    /// Creates an empty post search resolving `posts`.
    pub fn new(posts: Vec<Post>) -> Self {
        Self::with_resolver(PostResolver::new(posts))
    }

    /// Creates an empty post search using `resolver`.
    pub fn with_resolver(resolver: PostResolver) -> Self {
        Self::with_config(&post_config(), resolver)
    }

    /// Creates an empty search for `config` using `resolver`.
    pub fn with_config(config: &SearchConfig, resolver: PostResolver) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let search = TextSearch::new(config, Arc::clone(&store))
            .expect("valid search config")
            .with_resolver(resolver.clone());
        Self {
            search,
            store,
            resolver,
        }
    }

    /// Indexes every post the resolver knows about.
    pub fn index_all(&self) {
        for post in self.resolver.posts.iter() {
            self.search.update_entity(post).expect("indexing succeeds");
        }
    }
}

impl std::ops::Deref for TestSearch {
    type Target = TextSearch<Value>;

    fn deref(&self) -> &Self::Target {
        &self.search
    }
}

/// Runs `f` with the sample posts indexed.
///
/// # Example
///
/// ```rust
/// use textsearch_testkit::with_seeded_search;
///
/// with_seeded_search(|t| {
///     assert_eq!(t.matching_ids("plain").unwrap().len(), 2);
/// });
/// ```
pub fn with_seeded_search<F, R>(f: F) -> R
where
    F: FnOnce(&TestSearch) -> R,
{
    let test = TestSearch::new(sample_posts());
    test.index_all();
    f(&test)
}

/// Collects IDs as plain strings, for concise assertions.
pub fn id_strings<'a, I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a EntityId>,
{
    ids.into_iter().map(ToString::to_string).collect()
}

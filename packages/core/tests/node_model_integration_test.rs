//! Integration tests for NodeModel
//!
//! Tests cover:
//! - Resolver arguments arriving as JSON
//! - Schema and store changes between calls (no result caching)
//! - Several render contexts sharing one store and sink
//! - Dependency records streamed through a broadcast sink

use anyhow::Result;
use pagegraph_core::db::MemoryNodeStore;
use pagegraph_core::models::{
    AllNodesArgs, DependencyRecord, Node, NodeByIdArgs, NodesByIdsArgs, PageDependency, QueryArgs,
    QueryResult, TypeHandle,
};
use pagegraph_core::schema::SchemaRegistry;
use pagegraph_core::services::{BroadcastSink, MemorySink, NodeModel, NodeModelConfig};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

/// Test helper: blog schema and content
fn blog() -> (Arc<SchemaRegistry>, Arc<MemoryNodeStore>) {
    let schema = SchemaRegistry::new()
        .with_type(TypeHandle::interface("Node", &[]))
        .with_type(TypeHandle::interface("Publishable", &["Node"]))
        .with_type(TypeHandle::object("MarkdownRemark", &["Node"]))
        .with_type(TypeHandle::object("BlogPost", &["Node", "Publishable"]))
        .with_type(TypeHandle::object("Author", &["Node"]));

    let store = MemoryNodeStore::with_nodes([
        Node::new("md-1", "MarkdownRemark"),
        Node::new("author-1", "Author").with_field("name", json!("Ada")),
        Node::new("post-1", "BlogPost")
            .with_parent("md-1")
            .with_field("slug", json!("/hello"))
            .with_field("author", json!("author-1"))
            .with_field("date", json!("2021-03-01")),
        Node::new("post-2", "BlogPost")
            .with_field("slug", json!("/again"))
            .with_field("author", json!("author-1"))
            .with_field("date", json!("2021-05-01")),
    ]);

    (Arc::new(schema), Arc::new(store))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =========================================================================
// Resolver flow
// =========================================================================

#[tokio::test]
async fn test_page_query_from_resolver_json() -> Result<()> {
    init_tracing();
    let (schema, store) = blog();
    let sink = Arc::new(MemorySink::new());
    let model = NodeModel::new(schema, store, sink.clone(), NodeModelConfig::for_path("/hello"))?;

    let args: QueryArgs = serde_json::from_value(json!({
        "type": "BlogPost",
        "query": { "filter": { "slug": { "eq": "/hello" } } },
        "firstOnly": true
    }))?;
    let post = model.run_query(args, None).await?.into_option().unwrap();

    let author_args: NodeByIdArgs = serde_json::from_value(json!({
        "id": post.fields["author"],
        "type": "Author"
    }))?;
    let author = model.get_node_by_id(author_args, None)?.unwrap();

    assert_eq!(author.fields["name"], json!("Ada"));
    assert_eq!(
        sink.records(),
        vec![
            DependencyRecord::node("/hello", "post-1"),
            DependencyRecord::node("/hello", "author-1"),
        ]
    );
    assert_eq!(
        serde_json::to_value(sink.records())?,
        json!([
            { "path": "/hello", "nodeId": "post-1" },
            { "path": "/hello", "nodeId": "author-1" }
        ])
    );
    Ok(())
}

#[tokio::test]
async fn test_listing_page_tracks_connection() -> Result<()> {
    let (schema, store) = blog();
    let sink = Arc::new(MemorySink::new());
    let model = NodeModel::new(schema, store, sink.clone(), NodeModelConfig::for_path("/blog"))?;

    let args = QueryArgs::new("Publishable", json!(null))
        .with_sort(json!({ "fields": ["date"], "order": ["DESC"] }));
    let posts = model
        .run_query(args, Some(&PageDependency::connection("allBlogPost")))
        .await?;

    let ids: Vec<_> = posts.into_vec().into_iter().map(|n| n.id).collect();
    assert_eq!(ids, vec!["post-2", "post-1"]);
    assert_eq!(
        sink.records(),
        vec![DependencyRecord::connection("/blog", "allBlogPost")]
    );
    Ok(())
}

#[tokio::test]
async fn test_ancestor_lookup_feeds_tracked_lookup() -> Result<()> {
    let (schema, store) = blog();
    let sink = Arc::new(MemorySink::new());
    let model = NodeModel::new(schema, store, sink.clone(), NodeModelConfig::for_path("/hello"))?;

    let post = model
        .get_node_by_id(NodeByIdArgs::new("post-1"), None)?
        .unwrap();
    let root = model.find_root_node_ancestor(&post, None)?.unwrap();
    let tracked = model.track_page_dependencies(Some(root), None);

    assert_eq!(tracked.map(|n| n.id), Some("md-1".to_string()));
    assert_eq!(sink.len(), 2);
    Ok(())
}

// =========================================================================
// Schema and store evolution
// =========================================================================

#[tokio::test]
async fn test_new_types_are_seen_without_rebuilding_the_model() -> Result<()> {
    let (schema, store) = blog();
    let model = NodeModel::new(
        schema.clone(),
        store.clone(),
        Arc::new(MemorySink::new()),
        NodeModelConfig::default(),
    )?;

    let before = model
        .run_query(QueryArgs::new("Newsletter", json!(null)), None)
        .await?;
    assert_eq!(before, QueryResult::Many(vec![]));

    schema.add_type(TypeHandle::object("Newsletter", &["Node", "Publishable"]));
    store.add_node(Node::new("news-1", "Newsletter").with_field("date", json!("2021-04-01")));

    let after = model
        .run_query(QueryArgs::new("Newsletter", json!(null)), None)
        .await?;
    assert_eq!(after.len(), 1);

    let publishable = model.get_all_nodes(AllNodesArgs::of_type("Publishable"), None)?;
    let ids: Vec<_> = publishable.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["post-1", "post-2", "news-1"]);
    Ok(())
}

// =========================================================================
// Concurrent render contexts
// =========================================================================

#[tokio::test]
async fn test_render_contexts_share_store_and_sink() -> Result<()> {
    let (schema, store) = blog();
    let sink = Arc::new(MemorySink::new());
    let base = NodeModel::new(schema, store, sink.clone(), NodeModelConfig::default())?;

    let mut handles = Vec::new();
    for (path, slug) in [("/hello", "/hello"), ("/again", "/again")] {
        let model = base.with_context(path);
        handles.push(tokio::spawn(async move {
            let args =
                QueryArgs::new("BlogPost", json!({ "slug": { "eq": slug } })).first_only();
            model.run_query(args, None).await
        }));
    }
    for handle in handles {
        assert!(matches!(handle.await??, QueryResult::One(_)));
    }

    let records: HashSet<_> = sink.records().into_iter().collect();
    assert_eq!(
        records,
        HashSet::from([
            DependencyRecord::node("/hello", "post-1"),
            DependencyRecord::node("/again", "post-2"),
        ])
    );
    assert!(base.path().is_none());
    Ok(())
}

#[tokio::test]
async fn test_broadcast_sink_streams_records() -> Result<()> {
    let (schema, store) = blog();
    let sink = BroadcastSink::new();
    let mut rx = sink.subscribe();
    let model = NodeModel::new(
        schema,
        store,
        Arc::new(sink),
        NodeModelConfig::for_path("/authors"),
    )?;

    let nodes = model.get_nodes_by_ids(NodesByIdsArgs::new(["author-1", "post-1"]), None)?;
    assert_eq!(nodes.len(), 2);

    assert_eq!(rx.recv().await?, DependencyRecord::node("/authors", "author-1"));
    assert_eq!(rx.recv().await?, DependencyRecord::node("/authors", "post-1"));
    Ok(())
}

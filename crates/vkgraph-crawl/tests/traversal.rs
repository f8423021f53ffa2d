mod common;

use common::{page, profile_item, Call, FakeVk, RecordingGraph, Write};
use vkgraph_core::EdgeKind;
use vkgraph_crawl::traversal::{crawl, CrawlOptions};
use vkgraph_crawl::{ApiError, CrawlError};

fn opts(depth: u32) -> CrawlOptions {
    CrawlOptions {
        depth,
        dedupe: false,
    }
}

#[tokio::test]
async fn test_depth_zero_does_nothing() {
    let vk = FakeVk::default().with_user(1, "Root").with_followers(1, &[2]);
    let graph = RecordingGraph::default();

    let stats = crawl(&vk, &graph, "1", &opts(0)).await.unwrap();

    assert!(vk.calls().await.is_empty());
    assert!(graph.writes().await.is_empty());
    assert_eq!(stats.users_expanded, 0);
}

#[tokio::test]
async fn test_depth_one_counts() {
    let vk = FakeVk::default()
        .with_user(1, "Root")
        .with_user(2, "F1")
        .with_user(3, "F2")
        .with_followers(1, &[2, 3])
        .with_subscriptions(1, vec![page(10, "A"), page(11, "B"), page(12, "C")]);
    let graph = RecordingGraph::default();

    let stats = crawl(&vk, &graph, "1", &opts(1)).await.unwrap();

    assert_eq!(graph.count(|w| matches!(w, Write::User(_))).await, 1 + 2);
    assert_eq!(graph.count(|w| matches!(w, Write::Group(_))).await, 3);
    assert_eq!(
        graph
            .count(|w| matches!(w, Write::Edge(1, _, EdgeKind::Follows)))
            .await,
        2
    );
    assert_eq!(
        graph
            .count(|w| matches!(w, Write::Edge(1, _, EdgeKind::Subscribes)))
            .await,
        3
    );

    // Profile, followers, subscriptions for the root, then one profile per
    // follower; depth 0 below makes no calls.
    assert_eq!(vk.calls().await.len(), 3 + 2);
    assert_eq!(stats.users_upserted, 3);
    assert_eq!(stats.groups_upserted, 3);
    assert_eq!(stats.follow_edges, 2);
    assert_eq!(stats.subscribe_edges, 3);
}

#[tokio::test]
async fn test_write_order_for_a_follower() {
    let vk = FakeVk::default()
        .with_user(1, "Root")
        .with_user(2, "F1")
        .with_followers(1, &[2]);
    let graph = RecordingGraph::default();

    crawl(&vk, &graph, "1", &opts(1)).await.unwrap();

    assert_eq!(
        graph.writes().await,
        vec![
            Write::User(1),
            Write::User(2),
            Write::Edge(1, 2, EdgeKind::Follows),
        ]
    );
}

#[tokio::test]
async fn test_page_is_never_a_user() {
    // A page whose id collides with a known user id.
    let vk = FakeVk::default()
        .with_user(1, "Root")
        .with_user(7, "Namesake")
        .with_subscriptions(1, vec![page(7, "Page Seven")]);
    let graph = RecordingGraph::default();

    crawl(&vk, &graph, "1", &opts(2)).await.unwrap();

    assert_eq!(
        graph.writes().await,
        vec![
            Write::User(1),
            Write::Group(7),
            Write::Edge(1, 7, EdgeKind::Subscribes),
        ]
    );
    assert!(!vk.calls().await.contains(&Call::UserInfo("7".to_string())));
}

#[tokio::test]
async fn test_user_subscription_is_followed_and_expanded() {
    let vk = FakeVk::default()
        .with_user(1, "Root")
        .with_user(5, "Blogger")
        .with_user(6, "BloggerFan")
        .with_subscriptions(1, vec![profile_item(5)])
        .with_followers(5, &[6]);
    let graph = RecordingGraph::default();

    crawl(&vk, &graph, "1", &opts(2)).await.unwrap();

    let writes = graph.writes().await;
    assert!(writes.contains(&Write::Edge(1, 5, EdgeKind::Follows)));
    assert!(writes.contains(&Write::Edge(5, 6, EdgeKind::Follows)));
    assert!(vk.calls().await.contains(&Call::Followers("5".to_string())));
}

#[tokio::test]
async fn test_screen_name_resolves_to_numeric_id_for_lists() {
    // users.get accepts a screen name; list calls need the numeric id.
    let vk = FakeVk::default()
        .with_user(1, "Root")
        .with_user(2, "F1")
        .with_followers(1, &[2])
        .with_alias("root_user", 1);
    let graph = RecordingGraph::default();

    crawl(&vk, &graph, "root_user", &opts(1)).await.unwrap();

    let calls = vk.calls().await;
    assert_eq!(calls[0], Call::UserInfo("root_user".to_string()));
    assert_eq!(calls[1], Call::Followers("1".to_string()));
    assert_eq!(calls[2], Call::Subscriptions("1".to_string()));
}

#[tokio::test]
async fn test_revisits_without_dedupe() {
    // 1 and 2 follow each other.
    let vk = FakeVk::default()
        .with_user(1, "A")
        .with_user(2, "B")
        .with_followers(1, &[2])
        .with_followers(2, &[1]);
    let graph = RecordingGraph::default();

    let stats = crawl(&vk, &graph, "1", &opts(3)).await.unwrap();

    // 1 (depth 3) → 2 (depth 2) → 1 (depth 1): user 1 expanded twice.
    assert_eq!(stats.users_expanded, 3);
    let root_list_calls = vk
        .calls()
        .await
        .into_iter()
        .filter(|c| *c == Call::Followers("1".to_string()))
        .count();
    assert_eq!(root_list_calls, 2);
}

#[tokio::test]
async fn test_dedupe_expands_each_user_once() {
    let vk = FakeVk::default()
        .with_user(1, "A")
        .with_user(2, "B")
        .with_followers(1, &[2])
        .with_followers(2, &[1]);
    let graph = RecordingGraph::default();
    let options = CrawlOptions {
        depth: 3,
        dedupe: true,
    };

    let stats = crawl(&vk, &graph, "1", &options).await.unwrap();

    assert_eq!(stats.users_expanded, 2);
    // The back edge is still recorded.
    assert!(graph
        .writes()
        .await
        .contains(&Write::Edge(2, 1, EdgeKind::Follows)));
}

#[tokio::test]
async fn test_dedupe_skips_profile_refetch_for_expanded_user() {
    let vk = FakeVk::default()
        .with_user(1, "A")
        .with_user(2, "B")
        .with_followers(1, &[2])
        .with_followers(2, &[1]);
    let graph = RecordingGraph::default();
    let options = CrawlOptions {
        depth: 3,
        dedupe: true,
    };

    crawl(&vk, &graph, "1", &options).await.unwrap();

    // Once for the root, once when linking 2 -> 1; the revisit is free.
    let root_profile_calls = vk
        .calls()
        .await
        .into_iter()
        .filter(|c| *c == Call::UserInfo("1".to_string()))
        .count();
    assert_eq!(root_profile_calls, 2);
}

#[tokio::test]
async fn test_api_error_aborts_crawl() {
    let vk = FakeVk::default()
        .with_user(1, "Root")
        .with_user(2, "Private")
        .with_user(3, "Never")
        .with_followers(1, &[2, 3])
        .failing("users.getFollowers", "2");
    let graph = RecordingGraph::default();

    let err = crawl(&vk, &graph, "1", &opts(2)).await.unwrap_err();

    assert!(matches!(
        err,
        CrawlError::Api(ApiError::Remote { code: 30, .. })
    ));
    // Follower 3 is never reached.
    assert!(!graph.writes().await.contains(&Write::User(3)));
    assert!(!vk.calls().await.contains(&Call::UserInfo("3".to_string())));
}

#[tokio::test]
async fn test_unknown_follower_aborts_crawl() {
    let vk = FakeVk::default().with_user(1, "Root").with_followers(1, &[404]);
    let graph = RecordingGraph::default();

    let err = crawl(&vk, &graph, "1", &opts(1)).await.unwrap_err();

    assert!(matches!(err, CrawlError::Api(ApiError::UserNotFound(_))));
    assert_eq!(graph.writes().await, vec![Write::User(1)]);
}

#[tokio::test]
async fn test_items_without_id_are_skipped() {
    let vk = FakeVk::default()
        .with_user(1, "Root")
        .with_subscriptions(
            1,
            vec![
                serde_json::json!({"name": "no id", "type": "page"}),
                serde_json::json!({"name": "no id either"}),
            ],
        );
    let graph = RecordingGraph::default();

    let stats = crawl(&vk, &graph, "1", &opts(1)).await.unwrap();

    assert_eq!(stats.skipped_items, 2);
    assert_eq!(graph.writes().await, vec![Write::User(1)]);
}

//! Integration tests for visibility preloading.
//!
//! Scrolls a headless viewport past navigation anchors and checks that each
//! trigger warms its route's module exactly once through the router.
//!
//! Run with: `cargo test --test preload_integration`

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use folio::pages::SiteContext;
use folio::preload::{
    AnchorId, IntersectionObserver, ObserverOptions, PreloadState, PreloadTrigger, Rect, ViewportObserver,
};
use folio::routes::{site_routes, ModuleStatus, RouteId, SiteRouter};

// ============================================================================
// Helper Functions
// ============================================================================

fn router(public_dir: &std::path::Path) -> SiteRouter {
    let ctx = SiteContext {
        public_dir: public_dir.to_path_buf(),
        ..SiteContext::default()
    };
    SiteRouter::new(site_routes(ctx).unwrap())
}

fn trigger_for(router: &SiteRouter, route: RouteId, options: ObserverOptions) -> PreloadTrigger {
    let router = router.clone();
    PreloadTrigger::new(route, options, move |id| {
        router.preload(id);
    })
    .unwrap()
}

/// Feed every current entry to the trigger watching that anchor.
fn pump(observer: &ViewportObserver, triggers: &mut [PreloadTrigger]) {
    for (anchor, entry) in observer.entries() {
        for trigger in triggers.iter_mut() {
            if trigger.anchor() == Some(anchor) {
                trigger.handle_entry(&entry);
            }
        }
    }
}

async fn wait_for_status(router: &SiteRouter, id: RouteId, want: ModuleStatus) {
    for _ in 0..100 {
        if router.cache().status(id) == want {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("{} never reached {:?}", id, want);
}

// ============================================================================
// Integration Tests
// ============================================================================

#[tokio::test]
async fn test_scrolling_preloads_each_route_once() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("gallery")).unwrap();
    let router = router(dir.path());

    let observer = Arc::new(ViewportObserver::new(1280.0, 720.0));
    observer.place(AnchorId(1), Rect::new(0.0, 400.0, 120.0, 24.0));
    observer.place(AnchorId(2), Rect::new(0.0, 1600.0, 120.0, 24.0));

    let mut triggers = vec![
        trigger_for(&router, RouteId::About, ObserverOptions::default()),
        trigger_for(&router, RouteId::Gallery, ObserverOptions::default()),
    ];
    triggers[0].mount(AnchorId(1), observer.clone()).unwrap();
    triggers[1].mount(AnchorId(2), observer.clone()).unwrap();

    pump(&observer, &mut triggers);
    assert_eq!(triggers[0].state(), PreloadState::Triggered);
    assert_eq!(triggers[1].state(), PreloadState::Observing);
    assert!(!observer.is_observing(AnchorId(1)));
    wait_for_status(&router, RouteId::About, ModuleStatus::Resolved).await;
    assert_eq!(router.cache().status(RouteId::Gallery), ModuleStatus::NotRequested);

    observer.scroll_to(0.0, 1200.0);
    pump(&observer, &mut triggers);
    wait_for_status(&router, RouteId::Gallery, ModuleStatus::Resolved).await;

    // Scrolling back and forth does not refire
    observer.scroll_to(0.0, 0.0);
    pump(&observer, &mut triggers);
    observer.scroll_to(0.0, 1200.0);
    pump(&observer, &mut triggers);

    assert_eq!(router.cache().fetch_count(), 2);
    assert_eq!(observer.observed_count(), 0);
    assert_eq!(router.navigate("/gallery").await.status_code(), 200);
    assert_eq!(router.cache().fetch_count(), 2);
}

#[tokio::test]
async fn test_root_margin_preloads_before_visible() {
    let dir = TempDir::new().unwrap();
    let router = router(dir.path());

    let observer = Arc::new(ViewportObserver::new(1280.0, 720.0));
    observer.place(AnchorId(7), Rect::new(0.0, 850.0, 120.0, 24.0));

    let options = ObserverOptions::default().with_root_margin("200px".parse().unwrap());
    let mut triggers = vec![trigger_for(&router, RouteId::Contact, options)];
    triggers[0].mount(AnchorId(7), observer.clone()).unwrap();

    pump(&observer, &mut triggers);
    assert_eq!(triggers[0].state(), PreloadState::Triggered);
    wait_for_status(&router, RouteId::Contact, ModuleStatus::Resolved).await;
}

#[tokio::test]
async fn test_unmounted_trigger_never_preloads() {
    let dir = TempDir::new().unwrap();
    let router = router(dir.path());

    let observer = Arc::new(ViewportObserver::new(1280.0, 720.0));
    observer.place(AnchorId(3), Rect::new(0.0, 2000.0, 120.0, 24.0));

    {
        let mut trigger = trigger_for(&router, RouteId::About, ObserverOptions::default());
        trigger.mount(AnchorId(3), observer.clone()).unwrap();
        assert!(observer.is_observing(AnchorId(3)));
    }
    assert_eq!(observer.observed_count(), 0);

    observer.scroll_to(0.0, 1800.0);
    assert!(observer.entries().is_empty());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(router.cache().is_empty());
}

#[test]
fn test_preload_outside_runtime_is_skipped() {
    let dir = TempDir::new().unwrap();
    let router = router(dir.path());

    let observer = Arc::new(ViewportObserver::new(800.0, 600.0));
    observer.place(AnchorId(1), Rect::new(0.0, 0.0, 100.0, 20.0));
    let mut trigger = trigger_for(&router, RouteId::About, ObserverOptions::default());
    trigger.mount(AnchorId(1), observer.clone() as Arc<dyn IntersectionObserver>).unwrap();

    let (_, entry) = observer.entries()[0];
    assert!(trigger.handle_entry(&entry));
    assert!(router.cache().is_empty());
}

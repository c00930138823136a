//! Memoized rendering through a shared cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use rendercell::components::FormalGreeter;
use rendercell::test_utils::{CountingComponent, init_test_logging};
use rendercell::{
    CellError, Component, FnComponent, InputBundle, Instance, KeyDeriver, LockPolicy, Memoized,
    OpaqueValue, RenderCache, RenderError, bundle,
};

#[test]
fn test_greeting_sequence_counts_renders() {
    init_test_logging(None);
    let cache = Arc::new(RenderCache::new(16).unwrap());
    let component = CountingComponent::formal_greeter();
    let renders = component.counter();
    let greeter = Memoized::new(component, Arc::clone(&cache));

    let macron = bundle! { "name" => "Macron" };
    assert_eq!(&*greeter.call(&macron).unwrap(), "<h1>Hi, President Macron.</h1>");
    assert_eq!(&*greeter.call(&macron).unwrap(), "<h1>Hi, President Macron.</h1>");
    assert_eq!(renders.load(Ordering::SeqCst), 1);

    let merkel = bundle! { "name" => "Merkel", "title" => "Chancellor" };
    assert_eq!(&*greeter.call(&merkel).unwrap(), "<h1>Hi, Chancellor Merkel.</h1>");
    assert_eq!(renders.load(Ordering::SeqCst), 2);

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.size), (1, 2, 2));
}

#[test]
fn test_memoized_equals_direct_for_every_bundle() {
    let cache = Arc::new(RenderCache::new(4).unwrap());
    let greeter = Memoized::new(Instance::<FormalGreeter>::new(), cache);

    let bundles = [
        bundle! { "name" => "Macron" },
        bundle! { "name" => "Merkel", "title" => "Chancellor" },
        bundle! { "title" => "Chancellor", "name" => "Merkel" },
        bundle! { "name" => "Meloni", "title" => "Prime Minister", "extra" => vec![1, 2, 3] },
    ];
    for bundle in &bundles {
        let direct = greeter.render(bundle).unwrap();
        assert_eq!(&*greeter.call(bundle).unwrap(), direct);
        assert_eq!(&*greeter.call(bundle).unwrap(), direct);
    }
}

#[test]
fn test_reordered_bundles_share_one_entry() {
    let cache = Arc::new(RenderCache::new(4).unwrap());
    let component = CountingComponent::formal_greeter();
    let renders = component.counter();
    let greeter = Memoized::new(component, Arc::clone(&cache));

    let a = InputBundle::builder().insert("name", "Merkel").insert("title", "Chancellor").build();
    let b = InputBundle::builder().insert("title", "Chancellor").insert("name", "Merkel").build();
    greeter.call(&a).unwrap();
    greeter.call(&b).unwrap();

    assert_eq!(renders.load(Ordering::SeqCst), 1);
    assert_eq!(cache.size(), 1);
}

#[test]
fn test_capacity_bound_evicts_least_recent_greeting() {
    let cache = Arc::new(RenderCache::new(2).unwrap());
    let component = CountingComponent::formal_greeter();
    let renders = component.counter();
    let greeter = Memoized::new(component, Arc::clone(&cache));

    for name in ["Macron", "Merkel", "Macron", "Sanchez"] {
        greeter.call(&bundle! { "name" => name }).unwrap();
    }
    // Merkel was least recently used when Sanchez arrived.
    assert_eq!(renders.load(Ordering::SeqCst), 3);
    greeter.call(&bundle! { "name" => "Macron" }).unwrap();
    assert_eq!(renders.load(Ordering::SeqCst), 3);
    greeter.call(&bundle! { "name" => "Merkel" }).unwrap();
    assert_eq!(renders.load(Ordering::SeqCst), 4);

    assert_eq!(cache.size(), 2);
    assert_eq!(cache.stats().evictions, 2);
}

#[test]
fn test_clear_and_resize_through_shared_handle() {
    let cache = Arc::new(RenderCache::new(8).unwrap());
    let component = CountingComponent::formal_greeter();
    let renders = component.counter();
    let greeter = Memoized::new(component, Arc::clone(&cache));

    for name in ["a", "b", "c", "d"] {
        greeter.call(&bundle! { "name" => name }).unwrap();
    }
    greeter.cache().resize(2).unwrap();
    assert_eq!(cache.size(), 2);
    assert!(matches!(cache.resize(0), Err(CellError::CapacityViolation { requested: 0 })));
    assert_eq!(cache.capacity(), 2);

    cache.clear();
    assert_eq!(cache.size(), 0);
    greeter.call(&bundle! { "name" => "d" }).unwrap();
    assert_eq!(renders.load(Ordering::SeqCst), 5);
}

#[test]
fn test_opaque_input_rejected_only_on_memoized_path() {
    let cache = Arc::new(RenderCache::new(4).unwrap());
    let component = CountingComponent::formal_greeter();
    let renders = component.counter();
    let greeter = Memoized::new(component, cache);

    let bundle = bundle! {
        "name" => "Macron",
        "child" => OpaqueValue::new("component", Instance::<FormalGreeter>::new()),
    };

    assert_eq!(greeter.render(&bundle).unwrap(), "<h1>Hi, President Macron.</h1>");
    assert_eq!(renders.load(Ordering::SeqCst), 1);

    match greeter.call(&bundle) {
        Err(CellError::UnkeyableInput { path, .. }) => assert_eq!(path, "child"),
        other => panic!("expected UnkeyableInput, got {other:?}"),
    }
    assert_eq!(renders.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failures_are_retried_not_cached() {
    let cache = Arc::new(RenderCache::new(4).unwrap());
    let attempts = Arc::new(AtomicUsize::new(0));
    let flaky = {
        let attempts = Arc::clone(&attempts);
        FnComponent::new("flaky", move |bundle: &InputBundle, _| {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(RenderError::Other(anyhow::anyhow!("upstream unavailable")));
            }
            Ok(format!("<p>{}</p>", bundle.str_or("text", "")))
        })
    };
    let memoized = Memoized::new(flaky, Arc::clone(&cache));
    let input = bundle! { "text" => "hello" };

    let err = memoized.call(&input).unwrap_err();
    assert_eq!(err.to_string(), "upstream unavailable");
    assert!(cache.is_empty());

    assert_eq!(&*memoized.call(&input).unwrap(), "<p>hello</p>");
    assert_eq!(&*memoized.call(&input).unwrap(), "<p>hello</p>");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_components_share_cache_without_collisions() {
    let cache = Arc::new(RenderCache::new(8).unwrap());
    let greeter = Memoized::new(Instance::<FormalGreeter>::new(), Arc::clone(&cache));
    let shout = Memoized::new(
        FnComponent::new("shout", |bundle: &InputBundle, _| {
            Ok(bundle.require_str("name")?.to_uppercase())
        }),
        Arc::clone(&cache),
    );

    let input = bundle! { "name" => "Macron" };
    assert_eq!(&*greeter.call(&input).unwrap(), "<h1>Hi, President Macron.</h1>");
    assert_eq!(&*shout.call(&input).unwrap(), "MACRON");
    assert_ne!(
        greeter.deriver().derive_key(&input).unwrap(),
        KeyDeriver::new().derive_key(&input).unwrap()
    );
    assert_eq!(cache.size(), 2);
}

#[test]
fn test_concurrent_callers_render_each_bundle_once() {
    let cache = Arc::new(RenderCache::with_policy(16, LockPolicy::PerKey).unwrap());
    let renders = Arc::new(AtomicUsize::new(0));
    let slow = {
        let renders = Arc::clone(&renders);
        FnComponent::new("slow", move |bundle: &InputBundle, _| {
            renders.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(30));
            Ok(format!("<b>{}</b>", bundle.require_str("name")?))
        })
    };
    let memoized = Arc::new(Memoized::new(slow, Arc::clone(&cache)));
    let barrier = Arc::new(Barrier::new(12));

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let memoized = Arc::clone(&memoized);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let name = if i % 2 == 0 { "even" } else { "odd" };
                barrier.wait();
                memoized.call(&bundle! { "name" => name }).unwrap()
            })
        })
        .collect();

    let outputs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(outputs.iter().all(|o| &**o == "<b>even</b>" || &**o == "<b>odd</b>"));
    assert_eq!(renders.load(Ordering::SeqCst), 2);
    assert_eq!(cache.stats().misses, 2);
    assert_eq!(cache.stats().hits, 10);
}

#[test]
fn test_component_trait_object_can_be_memoized() {
    let cache = Arc::new(RenderCache::new(4).unwrap());
    let component: Arc<dyn Component> = Arc::new(Instance::<FormalGreeter>::new());
    let memoized = Memoized::new(component, cache);
    assert_eq!(memoized.component().name(), "formal-greeter");
    assert_eq!(
        &*memoized.call(&bundle! { "name" => "Merkel", "title" => "Chancellor" }).unwrap(),
        "<h1>Hi, Chancellor Merkel.</h1>"
    );
}

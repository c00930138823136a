//! Composition of components through nested content.

use std::sync::atomic::{AtomicUsize, Ordering};

use rendercell::components::{FormalGreeter, Layout, card};
use rendercell::config::TemplatingConfig;
use rendercell::{
    Component, FnComponent, InputBundle, Instance, Nested, RenderError, TemplateComponent, bundle,
    compose,
};

#[test]
fn test_layout_around_greeter() {
    let page = compose(
        &Layout,
        &bundle! { "heading" => "Summit" },
        &Instance::<FormalGreeter>::new(),
        &bundle! { "name" => "Macron" },
    )
    .unwrap();
    assert_eq!(page, "<main><header>Summit</header><h1>Hi, President Macron.</h1></main>");
}

#[test]
fn test_three_levels_of_nesting() {
    let card = card(&TemplatingConfig::default()).unwrap();
    let greeter = Instance::<FormalGreeter>::new();
    let greeting = bundle! { "name" => "Merkel", "title" => "Chancellor" };

    let inner = || compose(&card, &bundle! { "heading" => "Guest" }, &greeter, &greeting);
    let page = Layout.render(&bundle! { "heading" => "Summit" }, Nested::from_fn(&inner)).unwrap();

    assert_eq!(
        page,
        "<main><header>Summit</header><section class=\"card\"><h2>Guest</h2>\
         <div><h1>Hi, Chancellor Merkel.</h1></div></section></main>"
    );
}

#[test]
fn test_parent_that_ignores_nested_never_runs_child() {
    let renders = AtomicUsize::new(0);
    let child = FnComponent::new("child", |_: &InputBundle, _| {
        renders.fetch_add(1, Ordering::SeqCst);
        Ok("<p>child</p>".to_string())
    });
    let stub = FnComponent::new("stub", |_: &InputBundle, _| Ok("<hr>".to_string()));

    assert_eq!(compose(&stub, &bundle! {}, &child, &bundle! {}).unwrap(), "<hr>");
    assert_eq!(renders.load(Ordering::SeqCst), 0);
}

#[test]
fn test_parent_may_repeat_and_transform_nested() {
    let twice = FnComponent::new("twice", |_: &InputBundle, nested: Nested<'_>| {
        let first = nested.render()?;
        let second = nested.render()?.to_uppercase();
        Ok(format!("{first}|{second}"))
    });
    let child = FnComponent::new("child", |b: &InputBundle, _| Ok(b.str_or("v", "").to_string()));

    let out = compose(&twice, &bundle! {}, &child, &bundle! { "v" => "ab" }).unwrap();
    assert_eq!(out, "ab|AB");
}

#[test]
fn test_child_error_propagates_unchanged() {
    let greeter = Instance::<FormalGreeter>::new();
    let err = compose(&Layout, &bundle! {}, &greeter, &bundle! { "title" => "Dr" }).unwrap_err();
    match err {
        RenderError::MissingInput { key, .. } => assert_eq!(key, "name"),
        other => panic!("expected MissingInput, got {other:?}"),
    }
}

#[test]
fn test_template_skips_nested_when_not_referenced() {
    let plain = TemplateComponent::new("plain", "<p>{{ text }}</p>").unwrap();
    let failing = FnComponent::new("failing", |_: &InputBundle, _| {
        Err(RenderError::Other(anyhow::anyhow!("should never run")))
    });

    let out = compose(&plain, &bundle! { "text" => "static" }, &failing, &bundle! {}).unwrap();
    assert_eq!(out, "<p>static</p>");
}

#[test]
fn test_bundle_from_json_drives_template() {
    let bundle = InputBundle::try_from(serde_json::json!({
        "heading": "Agenda",
        "items": ["budget", "energy"],
    }))
    .unwrap();
    let list = TemplateComponent::new(
        "agenda",
        "<h2>{{ heading }}</h2><ul>{% for item in items %}<li>{{ item }}</li>{% endfor %}</ul>",
    )
    .unwrap();

    assert_eq!(
        list.render_plain(&bundle).unwrap(),
        "<h2>Agenda</h2><ul><li>budget</li><li>energy</li></ul>"
    );
}

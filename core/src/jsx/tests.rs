use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use wsx_host::{Event, HTML_NAMESPACE, NodeKind, SVG_NAMESPACE};

use super::*;
use crate::{children, h, props};

fn element(node: Node) -> Element {
    node.as_element().expect("expected an element")
}

#[test]
fn class_and_text_child() {
    let div = element(h("div", props! { "className" => "box" }, "hi").unwrap());
    assert_eq!(div.tag_name(), "DIV");
    assert_eq!(div.get_attribute("class").as_deref(), Some("box"));
    assert_eq!(div.to_node().text_content(), "hi");
}

#[test]
fn boolean_attributes() {
    let on = element(h("input", props! { "disabled" => true }, ()).unwrap());
    assert_eq!(on.get_attribute("disabled").as_deref(), Some(""));

    let off = element(h("input", props! { "disabled" => false }, ()).unwrap());
    assert!(!off.has_attribute("disabled"));
}

#[test]
fn null_values_never_produce_attributes() {
    let div = element(
        h(
            "div",
            props! { "title" => None::<&str>, "id" => (), "hidden" => false, "data-x" => "1" },
            (),
        )
        .unwrap(),
    );
    assert_eq!(div.attribute_names(), vec!["data-x".to_owned()]);
}

#[test]
fn scalar_attributes_and_name_mapping() {
    let label = element(
        h(
            "label",
            props! { "htmlFor" => "name", "tabindex" => 2, "data-ratio" => 0.5, "style" => "color: red" },
            (),
        )
        .unwrap(),
    );
    assert_eq!(label.get_attribute("for").as_deref(), Some("name"));
    assert_eq!(label.get_attribute("tabindex").as_deref(), Some("2"));
    assert_eq!(label.get_attribute("data-ratio").as_deref(), Some("0.5"));
    assert_eq!(label.get_attribute("style").as_deref(), Some("color: red"));
}

#[test]
fn nested_children_flatten_in_order() {
    let p = h(
        "p",
        Props::new(),
        children![
            "a",
            Child::List(vec![Child::Null, "b".into(), children![false, "c"]]),
            None::<Node>
        ],
    )
    .unwrap();

    let texts: Vec<_> = p.child_nodes().iter().map(Node::text_content).collect();
    assert_eq!(texts, ["a", "b", "c"]);
}

#[test]
fn numbers_and_true_children() {
    let span = h("span", Props::new(), children![1, true, 2.5]).unwrap();
    assert_eq!(span.child_nodes().len(), 2);
    assert_eq!(span.text_content(), "12.5");
}

#[test]
fn ref_runs_once_before_return() {
    let calls = Rc::new(Cell::new(0));
    let seen = calls.clone();
    let captured = Rc::new(RefCell::new(None));
    let slot = captured.clone();

    let node = h(
        "section",
        props! {
            "ref" => node_ref(move |element| {
                seen.set(seen.get() + 1);
                *slot.borrow_mut() = Some(element.clone());
            })
        },
        (),
    )
    .unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(captured.borrow().as_ref(), node.as_element().as_ref());
}

#[test]
fn listeners_use_lowercased_event_names() {
    let clicks = Rc::new(Cell::new(0));
    let seen = clicks.clone();
    let button = element(
        h(
            "button",
            props! {
                "onClick" => on(move |_| seen.set(seen.get() + 1)),
                "title" => on(|_| {}),
            },
            (),
        )
        .unwrap(),
    );

    button.dispatch_event(&Event::new("click").unwrap()).unwrap();
    button.dispatch_event(&Event::new("Click").unwrap()).unwrap();
    assert_eq!(clicks.get(), 1);
    assert!(!button.has_attribute("title"));
}

#[test]
fn function_components_get_props_and_flat_children() {
    let card = component(|props, children| {
        assert_eq!(children.len(), 2);
        h(
            "article",
            props! { "class" => props.text("variant").unwrap_or_default() },
            children,
        )
    });

    let node = h(
        card,
        props! { "variant" => "wide" },
        children!["x", children!["y"]],
    )
    .unwrap();
    let article = element(node);
    assert_eq!(article.class_name(), "wide");
    assert_eq!(article.to_node().text_content(), "xy");
}

#[test]
fn fragments() {
    let frag = fragment(children![
        "Hello",
        h("b", Props::new(), "World").unwrap()
    ])
    .unwrap();
    assert_eq!(frag.child_nodes().len(), 2);

    let parent = element(h("div", Props::new(), frag.clone()).unwrap());
    assert_eq!(parent.to_node().text_content(), "HelloWorld");
    assert!(frag.child_nodes().is_empty());

    let via_tag = h(component(Fragment), Props::new(), children!["a", "b"]).unwrap();
    assert_eq!(via_tag.kind(), NodeKind::DocumentFragment);
    assert_eq!(via_tag.text_content(), "ab");
}

#[test]
fn svg_namespaces() {
    let circle = element(h("circle", props! { "r" => 4 }, ()).unwrap());
    assert_eq!(circle.namespace_uri().as_deref(), Some(SVG_NAMESPACE));

    let div = element(h("div", Props::new(), ()).unwrap());
    assert_eq!(div.namespace_uri().as_deref(), Some(HTML_NAMESPACE));

    let html_text = element(h("text", Props::new(), ()).unwrap());
    assert_eq!(html_text.namespace_uri().as_deref(), Some(HTML_NAMESPACE));

    let svg_text = element(svg("text", props! { "x" => 1 }, "label").unwrap());
    assert_eq!(svg_text.namespace_uri().as_deref(), Some(SVG_NAMESPACE));

    let chart = element(
        h(
            "svg",
            props! { "viewBox" => "0 0 10 10", "className" => "chart" },
            children![svg("text", Props::new(), "t").unwrap()],
        )
        .unwrap(),
    );
    assert_eq!(chart.get_attribute("viewBox").as_deref(), Some("0 0 10 10"));
    assert_eq!(chart.get_attribute("class").as_deref(), Some("chart"));
    assert_eq!(
        chart.children()[0].namespace_uri().as_deref(),
        Some(SVG_NAMESPACE)
    );
}

#[test]
fn nested_children_take_the_svg_context_of_their_parent() {
    let chart = element(
        h(
            "svg",
            Props::new(),
            children![
                h("text", Props::new(), "eager").unwrap(),
                nested("text", props! { "x" => 2 }, "label"),
                nested(
                    "foreignObject",
                    Props::new(),
                    nested("title", Props::new(), "tip"),
                ),
            ],
        )
        .unwrap(),
    );

    let [eager, label, foreign] = chart.children().try_into().unwrap();
    assert_eq!(eager.namespace_uri().as_deref(), Some(HTML_NAMESPACE));
    assert_eq!(label.namespace_uri().as_deref(), Some(SVG_NAMESPACE));
    assert_eq!(label.get_attribute("x").as_deref(), Some("2"));
    assert_eq!(label.to_node().text_content(), "label");
    assert_eq!(foreign.namespace_uri().as_deref(), Some(SVG_NAMESPACE));
    assert_eq!(
        foreign.children()[0].namespace_uri().as_deref(),
        Some(HTML_NAMESPACE)
    );
}

#[test]
fn nested_children_outside_svg_stay_html() {
    let div = element(h("div", Props::new(), nested("title", Props::new(), "t")).unwrap());
    assert_eq!(div.children()[0].namespace_uri().as_deref(), Some(HTML_NAMESPACE));

    let list = fragment(children![nested("text", Props::new(), ())]).unwrap();
    let text = list.to_node().first_child().and_then(|node| node.as_element()).unwrap();
    assert_eq!(text.namespace_uri().as_deref(), Some(HTML_NAMESPACE));
}

#[test]
fn append_uses_the_parent_namespace() {
    let group = element(h("g", Props::new(), ()).unwrap());
    append(&group, children![nested("title", Props::new(), "tip"), "!"]).unwrap();

    let title = group.children()[0].clone();
    assert_eq!(title.namespace_uri().as_deref(), Some(SVG_NAMESPACE));
    assert_eq!(group.to_node().text_content(), "tip!");
}

#[test]
fn deferred_children_build_once() {
    let child = nested("span", Props::new(), "x");
    let Child::Deferred(deferred) = child.clone() else {
        panic!("expected a deferred child");
    };
    let first = element(h("p", Props::new(), child).unwrap());
    assert_eq!(first.children().len(), 1);
    assert!(deferred.build(CreateContext::html()).unwrap().is_none());
}

#[test]
fn h_macro_forms() {
    let empty = h!("hr").unwrap();
    assert!(empty.child_nodes().is_empty());

    let list = h!("ul", props! {}, h!("li", props! {}, "1").unwrap(), h!("li", props! {}, "2").unwrap())
        .unwrap();
    assert_eq!(list.child_nodes().len(), 2);
    assert_eq!(list.text_content(), "12");
}

#[test]
fn invalid_tags_fail() {
    assert!(h("bad tag", Props::new(), ()).is_err());
}

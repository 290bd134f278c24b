use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use super::*;
use crate::{CustomElement, ElementDefinition, HostError, NodeKind, SVG_NAMESPACE, listener};

#[derive(Default)]
struct Recorder {
    log: RefCell<Vec<String>>,
}

struct Probe {
    name: &'static str,
    recorder: Rc<Recorder>,
}

impl CustomElement for Probe {
    fn connected_callback(&self) {
        self.recorder
            .log
            .borrow_mut()
            .push(format!("{}:connected", self.name));
    }

    fn disconnected_callback(&self) {
        self.recorder
            .log
            .borrow_mut()
            .push(format!("{}:disconnected", self.name));
    }

    fn attribute_changed_callback(&self, name: &str, old: Option<&str>, new: Option<&str>) {
        self.recorder
            .log
            .borrow_mut()
            .push(format!("{}:{name}:{old:?}->{new:?}", self.name));
    }
}

fn define_probe(tag: &'static str, observed: &[&str]) -> Rc<Recorder> {
    let recorder = Rc::new(Recorder::default());
    let shared = recorder.clone();
    let definition = ElementDefinition::new(observed.iter().copied(), move |_element| {
        Ok(Rc::new(Probe {
            name: tag,
            recorder: shared.clone(),
        }) as Rc<dyn CustomElement>)
    });
    Document::current()
        .unwrap()
        .define_custom_element(tag, definition)
        .unwrap();
    recorder
}

fn body() -> Element {
    Document::current().unwrap().body().unwrap()
}

#[test]
fn document_skeleton_is_connected() {
    let document = Document::current().unwrap();
    let body = document.body().unwrap();
    assert_eq!(body.tag_name(), "BODY");
    assert!(body.to_node().is_connected());
    assert!(document.head().unwrap().to_node().is_connected());
    assert_eq!(document.to_node().kind(), NodeKind::Document);
}

#[test]
fn html_and_svg_names() {
    let document = Document::current().unwrap();
    let div = document.create_element("DIV").unwrap();
    assert_eq!(div.local_name(), "div");
    assert_eq!(div.tag_name(), "DIV");

    let gradient = document
        .create_element_ns(Some(SVG_NAMESPACE), "linearGradient")
        .unwrap();
    assert_eq!(gradient.tag_name(), "linearGradient");
    gradient.set_attribute("gradientUnits", "userSpaceOnUse").unwrap();
    assert_eq!(gradient.attribute_names(), vec!["gradientUnits".to_owned()]);

    div.set_attribute("DATA-Id", "1").unwrap();
    assert_eq!(div.get_attribute("data-id").as_deref(), Some("1"));
    assert!(matches!(
        document.create_element("bad tag"),
        Err(HostError::InvalidCharacter(_))
    ));
    assert!(div.set_attribute("a b", "x").is_err());
}

#[test]
fn fragments_are_emptied_into_their_parent() {
    let document = Document::current().unwrap();
    let fragment = document.create_document_fragment();
    fragment
        .append_child(&document.create_text_node("a"))
        .unwrap();
    fragment
        .append_child(&document.create_element("span").unwrap().to_node())
        .unwrap();

    let parent = document.create_element("div").unwrap();
    parent.append_child(&fragment.to_node()).unwrap();

    assert!(fragment.child_nodes().is_empty());
    assert_eq!(parent.to_node().child_nodes().len(), 2);
    assert_eq!(parent.children()[0].local_name(), "span");
}

#[test]
fn appending_moves_nodes() {
    let document = Document::current().unwrap();
    let first = document.create_element("div").unwrap();
    let second = document.create_element("div").unwrap();
    let child = document.create_element("p").unwrap();

    first.append_child(&child.to_node()).unwrap();
    second.append_child(&child.to_node()).unwrap();

    assert!(first.children().is_empty());
    assert_eq!(second.children(), vec![child.clone()]);
    assert_eq!(child.to_node().parent_node(), Some(second.to_node()));
}

#[test]
fn invalid_hierarchies_are_rejected() {
    let document = Document::current().unwrap();
    let outer = document.create_element("div").unwrap();
    let inner = document.create_element("div").unwrap();
    outer.append_child(&inner.to_node()).unwrap();

    assert!(matches!(
        inner.append_child(&outer.to_node()),
        Err(HostError::HierarchyRequest(_))
    ));
    assert!(outer.append_child(&outer.to_node()).is_err());

    let text = document.create_text_node("x");
    assert!(text.append_child(&inner.to_node()).is_err());

    let stranger = document.create_element("span").unwrap();
    assert_eq!(
        outer.to_node().remove_child(&stranger.to_node()),
        Err(HostError::NotFound)
    );
}

#[test]
fn lifecycle_reactions_follow_connection() {
    let recorder = define_probe("probe-life", &[]);
    let document = Document::current().unwrap();

    let wrapper = document.create_element("div").unwrap();
    let probe = document.create_element("probe-life").unwrap();
    wrapper.append_child(&probe.to_node()).unwrap();
    assert!(recorder.log.borrow().is_empty());

    body().append_child(&wrapper.to_node()).unwrap();
    assert_eq!(*recorder.log.borrow(), vec!["probe-life:connected"]);

    body().to_node().remove_child(&wrapper.to_node()).unwrap();
    assert_eq!(
        *recorder.log.borrow(),
        vec!["probe-life:connected", "probe-life:disconnected"]
    );
}

#[test]
fn reactions_reach_into_shadow_trees() {
    let recorder = define_probe("probe-nested", &[]);
    let document = Document::current().unwrap();

    let outer = document.create_element("section").unwrap();
    let shadow = outer.attach_shadow().unwrap();
    shadow
        .append_child(&document.create_element("probe-nested").unwrap().to_node())
        .unwrap();

    body().append_child(&outer.to_node()).unwrap();
    assert_eq!(*recorder.log.borrow(), vec!["probe-nested:connected"]);

    shadow.remove_children().unwrap();
    assert_eq!(recorder.log.borrow().last().unwrap(), "probe-nested:disconnected");
}

#[test]
fn observed_attributes_only() {
    let recorder = define_probe("probe-attrs", &["title"]);
    let probe = Document::current()
        .unwrap()
        .create_element("probe-attrs")
        .unwrap();

    probe.set_attribute("title", "a").unwrap();
    probe.set_attribute("lang", "en").unwrap();
    probe.set_attribute("title", "b").unwrap();
    probe.remove_attribute("title").unwrap();
    probe.remove_attribute("title").unwrap();

    assert_eq!(
        *recorder.log.borrow(),
        vec![
            "probe-attrs:title:None->Some(\"a\")",
            "probe-attrs:title:Some(\"a\")->Some(\"b\")",
            "probe-attrs:title:Some(\"b\")->None",
        ]
    );
}

#[test]
fn defining_upgrades_connected_elements() {
    let document = Document::current().unwrap();
    let early = document.create_element("probe-late").unwrap();
    body().append_child(&early.to_node()).unwrap();

    let recorder = define_probe("probe-late", &[]);
    assert_eq!(*recorder.log.borrow(), vec!["probe-late:connected"]);
    assert!(document.is_custom_element_defined("probe-late"));

    let again = ElementDefinition::new(Vec::<String>::new(), |_| {
        Err(HostError::NotSupported("unused".into()))
    });
    assert!(matches!(
        document.define_custom_element("probe-late", again.clone()),
        Err(HostError::NotSupported(_))
    ));
    assert!(matches!(
        document.define_custom_element("nohyphen", again),
        Err(HostError::Syntax(_))
    ));
}

#[test]
fn failing_constructor_leaves_a_plain_element() {
    let document = Document::current().unwrap();
    document
        .define_custom_element(
            "probe-broken",
            ElementDefinition::new(Vec::<String>::new(), |_| {
                Err(HostError::Js("boom".into()))
            }),
        )
        .unwrap();
    let element = document.create_element("probe-broken").unwrap();
    assert!(!element.is_upgraded());
}

#[test]
fn events_run_listeners_in_order() {
    let document = Document::current().unwrap();
    let button = document.create_element("button").unwrap();
    let calls = Rc::new(RefCell::new(Vec::new()));

    for label in ["first", "second"] {
        let calls = calls.clone();
        button
            .add_event_listener(
                "click",
                listener(move |event| {
                    calls.borrow_mut().push(label);
                    if label == "second" {
                        event.prevent_default();
                    }
                }),
            )
            .unwrap();
    }
    let other = calls.clone();
    button
        .add_event_listener("input", listener(move |_| other.borrow_mut().push("input")))
        .unwrap();

    let event = Event::new("click").unwrap();
    assert!(!button.dispatch_event(&event).unwrap());
    assert_eq!(*calls.borrow(), vec!["first", "second"]);
    assert_eq!(event.target(), Some(button.clone()));

    assert!(button.dispatch_event(&Event::new("focus").unwrap()).unwrap());
}

#[test]
fn shadow_roots() {
    let document = Document::current().unwrap();
    let host = document.create_element("div").unwrap();
    let shadow = host.attach_shadow().unwrap();

    assert_eq!(shadow.host(), Some(host.clone()));
    assert_eq!(host.shadow_root(), Some(shadow.clone()));
    assert!(matches!(host.attach_shadow(), Err(HostError::NotSupported(_))));
    assert!(shadow.to_node().parent_node().is_none());

    shadow
        .append_child(&document.create_text_node("inside"))
        .unwrap();
    assert_eq!(shadow.text_content(), "inside");
    assert_eq!(host.to_node().text_content(), "");

    assert!(!shadow.to_node().is_connected());
    body().append_child(&host.to_node()).unwrap();
    assert!(shadow.to_node().is_connected());
}

#[test]
fn adopted_style_sheets() {
    let document = Document::current().unwrap();
    let shadow = document.create_element("div").unwrap().attach_shadow().unwrap();
    let sheet = document.create_style_sheet(":host { color: red; }").unwrap();

    shadow.set_adopted_style_sheets(&[sheet.clone()]).unwrap();
    shadow.remove_children().unwrap();
    assert_eq!(shadow.adopted_style_sheets(), vec![sheet.clone()]);

    sheet.replace_sync("p {}").unwrap();
    assert_eq!(shadow.adopted_style_sheets()[0].css_text(), "p {}");

    document.set_adopted_style_sheets_supported(false);
    assert!(document.create_style_sheet("").is_err());
    assert!(shadow.set_adopted_style_sheets(&[sheet]).is_err());
    document.set_adopted_style_sheets_supported(true);
}

#[test]
fn focus_is_tracked_and_retargeted() {
    let document = Document::current().unwrap();
    let host = document.create_element("div").unwrap();
    let shadow = host.attach_shadow().unwrap();
    let input = document.create_element("input").unwrap();
    shadow.append_child(&input.to_node()).unwrap();

    input.focus(true).unwrap();
    assert_eq!(document.active_element(), None);

    body().append_child(&host.to_node()).unwrap();
    input.focus(true).unwrap();
    assert_eq!(shadow.active_element(), Some(input.clone()));
    assert_eq!(document.active_element(), Some(host.clone()));

    shadow.remove_children().unwrap();
    assert_eq!(shadow.active_element(), None);
    assert_eq!(document.active_element(), None);

    let other = document.create_element("textarea").unwrap();
    body().append_child(&other.to_node()).unwrap();
    other.focus(false).unwrap();
    other.blur();
    assert_eq!(document.active_element(), None);
}

#[test]
fn form_values_and_selection() {
    let document = Document::current().unwrap();
    let input = document.create_element("input").unwrap();
    input.set_attribute("value", "seed").unwrap();
    assert_eq!(input.value().as_deref(), Some("seed"));
    assert_eq!(input.selection_range(), Some((4, 4)));

    input.set_value("hello").unwrap();
    assert_eq!(input.value().as_deref(), Some("hello"));
    assert_eq!(input.get_attribute("value").as_deref(), Some("seed"));
    assert_eq!(input.selection_range(), Some((5, 5)));

    input.set_selection_range(1, 99).unwrap();
    assert_eq!(input.selection_range(), Some((1, 5)));

    let textarea = document.create_element("textarea").unwrap();
    textarea.set_text_content("body").unwrap();
    assert_eq!(textarea.value().as_deref(), Some("body"));

    let div = document.create_element("div").unwrap();
    assert_eq!(div.value(), None);
    assert!(div.set_value("x").is_err());
    assert!(div.set_selection_range(0, 0).is_err());

    div.set_attribute("contenteditable", "true").unwrap();
    div.set_text_content("editable").unwrap();
    assert!(div.is_content_editable());
    assert_eq!(div.selection_range(), None);
    div.set_selection_range(2, 4).unwrap();
    assert_eq!(div.selection_range(), Some((2, 4)));
}

#[test]
fn query_selectors_skip_shadow_trees() {
    let document = Document::current().unwrap();
    let root = document.create_element("div").unwrap();
    let first = document.create_element("input").unwrap();
    first.set_class_name("field name").unwrap();
    let second = document.create_element("input").unwrap();
    second.set_attribute("type", "text").unwrap();
    root.append_child(&first.to_node()).unwrap();
    root.append_child(&second.to_node()).unwrap();

    let hidden = document.create_element("input").unwrap();
    first
        .attach_shadow()
        .unwrap()
        .append_child(&hidden.to_node())
        .unwrap();

    assert_eq!(root.query_selector(".name").unwrap(), Some(first.clone()));
    assert_eq!(
        root.query_selector("input[type=\"text\"]").unwrap(),
        Some(second.clone())
    );
    assert_eq!(root.query_selector_all("INPUT").unwrap(), vec![first, second]);
    assert_eq!(root.query_selector("#missing").unwrap(), None);
    assert!(root.query_selector("div input").is_err());
}

#[test]
fn text_content_replacement() {
    let document = Document::current().unwrap();
    let p = document.create_element("p").unwrap();
    p.append_child(&document.create_element("b").unwrap().to_node())
        .unwrap();
    p.set_text_content("plain").unwrap();
    assert_eq!(p.to_node().child_nodes().len(), 1);
    assert_eq!(p.to_node().text_content(), "plain");
    p.set_text_content("").unwrap();
    assert!(p.to_node().first_child().is_none());
}

#[test]
fn microtasks_drain_including_requeued() {
    let ran = Rc::new(Cell::new(0));
    let counter = ran.clone();
    queue_microtask(move || {
        counter.set(counter.get() + 1);
        let inner = counter.clone();
        queue_microtask(move || inner.set(inner.get() + 10));
        assert_eq!(perform_microtask_checkpoint(), 0);
    });

    assert_eq!(ran.get(), 0);
    assert_eq!(perform_microtask_checkpoint(), 2);
    assert_eq!(ran.get(), 11);
    assert_eq!(perform_microtask_checkpoint(), 0);
}

#[test]
fn a_panicking_microtask_does_not_stall_later_checkpoints() {
    queue_microtask(|| panic!("task failed"));
    let result = std::panic::catch_unwind(perform_microtask_checkpoint);
    assert!(result.is_err());

    let ran = Rc::new(Cell::new(false));
    let flag = ran.clone();
    queue_microtask(move || flag.set(true));
    assert_eq!(perform_microtask_checkpoint(), 1);
    assert!(ran.get());
}

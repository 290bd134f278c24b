//! Keeping focus across rerenders.
//!
//! A rerender replaces every node in the shadow root, so the focused control is
//! destroyed. Before rendering we note what was focused, and afterwards we look for
//! an equivalent element: first one sharing the old first class, then one with the
//! same tag. The match is a heuristic and may pick a different element when the new
//! content reorders or repeats elements.

use wsx_host::{Element, HostError, ShadowRoot};

use super::Host;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FocusSnapshot {
    tag: String,
    classes: Vec<String>,
    value: Option<String>,
    selection: Option<(u32, u32)>,
}

fn capture(shadow: &ShadowRoot) -> Option<FocusSnapshot> {
    let active = shadow.active_element()?;
    let editable = active.value().is_some() || active.is_content_editable();
    Some(FocusSnapshot {
        tag: active.local_name(),
        classes: active.class_list(),
        value: active.value(),
        selection: if editable {
            active.selection_range()
        } else {
            None
        },
    })
}

fn relocate(shadow: &ShadowRoot, snapshot: &FocusSnapshot) -> Result<Option<Element>, HostError> {
    if let Some(class) = snapshot.classes.first() {
        let by_class = shadow
            .query_selector_all("*")?
            .into_iter()
            .find(|element| element.class_list().contains(class));
        if by_class.is_some() {
            return Ok(by_class);
        }
    }
    shadow.query_selector(&snapshot.tag)
}

fn restore(shadow: &ShadowRoot, snapshot: &FocusSnapshot) -> Result<(), HostError> {
    let Some(target) = relocate(shadow, snapshot)? else {
        tracing::trace!(tag = %snapshot.tag, "no element to move focus to");
        return Ok(());
    };

    target.focus(true)?;
    if let Some(value) = &snapshot.value {
        if target.value().is_some() {
            target.set_value(value)?;
        }
    }
    if let Some((start, end)) = snapshot.selection {
        target.set_selection_range(start, end)?;
    }
    Ok(())
}

/// Rerenders `host`, moving focus, value and selection to the matching element of
/// the new content. Failing to restore focus is not an error.
pub(super) fn rerender_preserving_focus(host: &Host) {
    let shadow = host.shadow_root();
    let snapshot = capture(shadow);
    host.rerender();

    if let Some(snapshot) = snapshot {
        if let Err(err) = restore(shadow, &snapshot) {
            tracing::trace!("[{}] focus not restored: {err}", host.name());
        }
    }
}

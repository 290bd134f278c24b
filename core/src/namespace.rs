//! Namespace-aware element creation.
//!
//! Most tags are HTML. Tags that only exist in SVG are always created in the SVG
//! namespace; a handful of tags exist in both and follow the [`CreateContext`] they
//! are created in.

use wsx_host::{Document, Element, HostError, SVG_NAMESPACE};

const SVG_ONLY_ELEMENTS: &[&str] = &[
    // structure
    "svg",
    "defs",
    "g",
    "symbol",
    "use",
    // shapes
    "circle",
    "ellipse",
    "line",
    "path",
    "polygon",
    "polyline",
    "rect",
    // text
    "textPath",
    "tspan",
    // paint servers
    "linearGradient",
    "radialGradient",
    "stop",
    "pattern",
    // filters
    "filter",
    "feBlend",
    "feColorMatrix",
    "feComponentTransfer",
    "feComposite",
    "feConvolveMatrix",
    "feDiffuseLighting",
    "feDisplacementMap",
    "feDistantLight",
    "feDropShadow",
    "feFlood",
    "feFuncA",
    "feFuncB",
    "feFuncG",
    "feFuncR",
    "feGaussianBlur",
    "feImage",
    "feMerge",
    "feMergeNode",
    "feMorphology",
    "feOffset",
    "fePointLight",
    "feSpecularLighting",
    "feSpotLight",
    "feTile",
    "feTurbulence",
    // animation
    "animate",
    "animateMotion",
    "animateTransform",
    "set",
    // misc
    "clipPath",
    "foreignObject",
    "marker",
    "mask",
    "metadata",
    "switch",
    "desc",
];

const DUAL_ELEMENTS: &[&str] = &["image", "style", "title", "text"];

const FORCE_HTML_ELEMENTS: &[&str] = &["a"];

/// Whether `tag` only exists in SVG. Case-sensitive.
#[must_use]
pub fn is_svg_only_element(tag: &str) -> bool {
    SVG_ONLY_ELEMENTS.contains(&tag)
}

/// Whether `tag` exists in both HTML and SVG. Case-sensitive.
#[must_use]
pub fn is_dual_element(tag: &str) -> bool {
    DUAL_ELEMENTS.contains(&tag)
}

/// Whether `tag` is always created as HTML, even inside SVG. Case-sensitive.
#[must_use]
pub fn is_force_html_element(tag: &str) -> bool {
    FORCE_HTML_ELEMENTS.contains(&tag)
}

/// Whether `tag` is created in the SVG namespace under `cx`.
#[must_use]
pub fn is_svg_element(tag: &str, cx: CreateContext) -> bool {
    is_svg_only_element(tag) || (is_dual_element(tag) && cx.in_svg)
}

/// Maps JSX-style property names to attribute names.
#[must_use]
pub fn attribute_name(name: &str) -> &str {
    match name {
        "className" => "class",
        "htmlFor" => "for",
        other => other,
    }
}

/// Where an element is being created: inside SVG content or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CreateContext {
    /// Dual tags (`image`, `style`, `title`, `text`) become SVG elements when set.
    pub in_svg: bool,
}

impl CreateContext {
    /// Plain HTML content.
    #[must_use]
    pub const fn html() -> Self {
        Self { in_svg: false }
    }

    /// SVG content.
    #[must_use]
    pub const fn svg() -> Self {
        Self { in_svg: true }
    }

    /// The context for children of `parent`: SVG unless the parent is HTML or a
    /// `foreignObject`.
    #[must_use]
    pub fn child_of(parent: &Element) -> Self {
        let in_svg = parent.namespace_uri().as_deref() == Some(SVG_NAMESPACE)
            && parent.local_name() != "foreignObject";
        Self { in_svg }
    }

    /// The context the children of a freshly created `tag` see.
    #[must_use]
    pub fn enter(self, tag: &str) -> Self {
        if tag == "foreignObject" {
            Self::html()
        } else if is_svg_only_element(tag) {
            Self::svg()
        } else {
            self
        }
    }
}

/// Creates `tag` in the namespace it belongs to under `cx`.
///
/// # Errors
///
/// Propagates host failures, e.g. for invalid tag names.
pub fn create_element(
    document: &Document,
    tag: &str,
    cx: CreateContext,
) -> Result<Element, HostError> {
    if !is_force_html_element(tag) && is_svg_element(tag, cx) {
        document.create_element_ns(Some(SVG_NAMESPACE), tag)
    } else {
        document.create_element(tag)
    }
}

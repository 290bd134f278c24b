//! Shared component style sheets.

use std::{cell::RefCell, collections::HashMap};

use wsx_host::{Document, HostError, ShadowRoot, StyleSheet};

thread_local! {
    static SHEETS: RefCell<HashMap<String, StyleSheet>> = RefCell::new(HashMap::new());
}

/// Caches one constructable style sheet per style name and adopts it into shadow
/// roots. Hosts without constructable style sheets get a `<style>` element instead.
#[derive(Debug, Clone, Copy)]
pub struct StyleManager;

impl StyleManager {
    /// Returns the cached sheet for `name`, creating it from `css` on first use.
    ///
    /// Later calls with the same name return the first sheet even if `css` differs.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotSupported`] when the host lacks constructable style
    /// sheets.
    pub fn style_sheet(name: &str, css: &str) -> Result<StyleSheet, HostError> {
        if let Some(sheet) = SHEETS.with(|sheets| sheets.borrow().get(name).cloned()) {
            return Ok(sheet);
        }

        let document = Document::current()?;
        if !document.supports_adopted_style_sheets() {
            return Err(HostError::NotSupported(
                "constructable style sheets".to_owned(),
            ));
        }
        let sheet = document.create_style_sheet(css)?;
        SHEETS.with(|sheets| {
            sheets.borrow_mut().insert(name.to_owned(), sheet.clone());
        });
        tracing::debug!(name, "created shared style sheet");
        Ok(sheet)
    }

    /// Adopts the shared sheet for `name` into `shadow`, falling back to a
    /// `<style>` element.
    ///
    /// # Errors
    ///
    /// Fails only if the fallback cannot be inserted either.
    pub fn apply_styles(shadow: &ShadowRoot, name: &str, css: &str) -> Result<(), HostError> {
        let adopted = Self::style_sheet(name, css)
            .and_then(|sheet| shadow.set_adopted_style_sheets(&[sheet]));
        match adopted {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::debug!("falling back to <style> for `{name}`: {err}");
                Self::apply_styles_fallback(shadow, css)
            }
        }
    }

    /// Appends a `<style>` element holding `css` to `shadow`.
    ///
    /// # Errors
    ///
    /// Propagates host failures.
    pub fn apply_styles_fallback(shadow: &ShadowRoot, css: &str) -> Result<(), HostError> {
        let document = Document::current()?;
        let style = document.create_element("style")?;
        style.set_text_content(css)?;
        shadow.append_child(&style.to_node())
    }

    /// Whether a sheet for `name` has been cached.
    #[must_use]
    pub fn is_cached(name: &str) -> bool {
        SHEETS.with(|sheets| sheets.borrow().contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shadow() -> ShadowRoot {
        Document::current()
            .unwrap()
            .create_element("div")
            .unwrap()
            .attach_shadow()
            .unwrap()
    }

    #[test]
    fn sheets_are_shared_per_name() {
        let (a, b) = (shadow(), shadow());
        StyleManager::apply_styles(&a, "card", ":host { display: block; }").unwrap();
        StyleManager::apply_styles(&b, "card", "ignored").unwrap();

        assert!(StyleManager::is_cached("card"));
        assert_eq!(a.adopted_style_sheets(), b.adopted_style_sheets());
        assert_eq!(
            b.adopted_style_sheets()[0].css_text(),
            ":host { display: block; }"
        );
        assert!(a.child_nodes().is_empty());
    }

    #[test]
    fn falls_back_to_style_element() {
        let document = Document::current().unwrap();
        document.set_adopted_style_sheets_supported(false);

        let root = shadow();
        StyleManager::apply_styles(&root, "legacy", "p { margin: 0; }").unwrap();

        assert!(root.adopted_style_sheets().is_empty());
        assert!(!StyleManager::is_cached("legacy"));
        let style = root.query_selector("style").unwrap().unwrap();
        assert_eq!(style.to_node().text_content(), "p { margin: 0; }");

        document.set_adopted_style_sheets_supported(true);
    }
}

use std::{cell::RefCell, fmt, rc::Rc};

/// A constructable style sheet that can be adopted by any number of shadow roots.
#[derive(Clone)]
pub struct StyleSheet(Rc<RefCell<String>>);

impl StyleSheet {
    pub(super) fn new(css: &str) -> Self {
        Self(Rc::new(RefCell::new(css.to_owned())))
    }

    /// Replaces the rules of the sheet.
    ///
    /// # Errors
    ///
    /// Never fails on this backend; the browser backend reports parse errors.
    pub fn replace_sync(&self, css: &str) -> Result<(), crate::HostError> {
        css.clone_into(&mut self.0.borrow_mut());
        Ok(())
    }

    /// The CSS text of the sheet.
    #[must_use]
    pub fn css_text(&self) -> String {
        self.0.borrow().clone()
    }
}

impl PartialEq for StyleSheet {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for StyleSheet {}

impl fmt::Debug for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StyleSheet").field(&self.0.borrow()).finish()
    }
}

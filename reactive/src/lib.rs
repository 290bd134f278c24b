#![warn(missing_docs)]
#![warn(clippy::pedantic)]

//! Batched reactive state for WSX.
//!
//! Reactive values ([`reactive`], [`reactive_with_debug`]) and state pairs
//! ([`create_state`]) notify a [`ReactiveCallback`] when a write actually changes
//! something. Notifications never run synchronously: they are handed to the
//! thread's [`UpdateScheduler`], which runs each distinct callback once in the next
//! microtask.
//!
//! ```
//! use std::{cell::Cell, rc::Rc};
//! use wsx_reactive::{callback, create_state};
//!
//! let renders = Rc::new(Cell::new(0));
//! let seen = renders.clone();
//! let (_, set) = create_state(0, callback(move || seen.set(seen.get() + 1)));
//!
//! set.set(1);
//! set.set(2);
//! set.set(3);
//! wsx_host::perform_microtask_checkpoint();
//! assert_eq!(renders.get(), 1);
//! ```

mod debug;
mod reactive;
pub mod scheduler;
mod state;

pub use debug::ReactiveDebug;
pub use reactive::{Reactive, reactive, reactive_with_debug, short_type_name};
pub use scheduler::{ReactiveCallback, UpdateScheduler, callback, schedule};
pub use state::{StateGetter, StateSetter, create_state};

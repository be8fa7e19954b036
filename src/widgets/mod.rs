//! Headless widget state machines.
//!
//! Nothing here renders. Each widget owns its interaction state and reacts
//! to keyboard and pointer input; focus moves through a [`Document`], the
//! stand-in for the host's element tree.

pub mod carousel;
pub mod disclosure;
pub mod document;
pub mod key;
pub mod modal;
pub mod select;

pub use carousel::Carousel;
pub use disclosure::{Accordion, AccordionMode, Disclosure};
pub use document::{Document, ElementId, ElementSpec};
pub use key::{Key, KeyEvent};
pub use modal::{Modal, ModalOptions, ModalState};
pub use select::{Combobox, SelectOption, SelectResponse};

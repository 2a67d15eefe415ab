use std::fmt;

/// Category of a problem found while declaring or laying out the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutErrorKind {
    /// A text element was declared before a [`crate::MeasureText`] was set.
    TextMeasurementFunctionNotProvided,
    /// More elements were declared than `Capacity::max_element_count`.
    ElementsCapacityExceeded,
    /// The word measurement cache is full; words are measured uncached.
    TextMeasurementCapacityExceeded,
    /// Two elements declared the same id in one frame.
    DuplicateId,
    /// A floating element referenced an element id that was not declared.
    FloatingContainerParentNotFound,
    /// The layout solver rejected the tree.
    InternalError,
}

impl fmt::Display for LayoutErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutErrorKind::TextMeasurementFunctionNotProvided => {
                "text measurement function not provided"
            }
            LayoutErrorKind::ElementsCapacityExceeded => "elements capacity exceeded",
            LayoutErrorKind::TextMeasurementCapacityExceeded => {
                "text measurement capacity exceeded"
            }
            LayoutErrorKind::DuplicateId => "duplicate id",
            LayoutErrorKind::FloatingContainerParentNotFound => {
                "floating container parent not found"
            }
            LayoutErrorKind::InternalError => "internal error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct LayoutError {
    pub kind: LayoutErrorKind,
    pub message: String,
}

impl LayoutError {
    pub fn new(kind: LayoutErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Receives recoverable layout errors. Layout continues after the call.
pub type ErrorHandler = Box<dyn FnMut(&LayoutError)>;

use std::fmt;

use core_types::ProductId;

/// One user activation, described the way an accessibility client sees the
/// target: stable id, role and visible label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interaction {
    pub id: &'static str,
    pub role: &'static str,
    pub label: &'static str,
}

impl Interaction {
    pub fn button(product: ProductId) -> Self {
        Self {
            id: product.accessibility_id(),
            role: "button",
            label: product.button_label(),
        }
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Element Clicked: ID='{}', Role='{}', Label='{}'",
            self.id, self.role, self.label
        )
    }
}

//! Sample documents listed in the sidebar.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document {
    pub title: &'static str,
    pub contents: &'static str,
}

pub const DOCUMENTS: &[Document] = &[
    Document {
        title: "Squirrels",
        contents: "The Secret Life of Squirrels: Nature's Clever Acrobats\n\
Squirrels are often overlooked creatures, dismissed as mere park inhabitants or backyard \
nuisances. Yet beneath their fluffy tails and twitching noses lies an intricate world of \
cunning, agility, and survival tactics that are nothing short of fascinating. As one of the \
most common mammals in North America, squirrels have adapted to a wide range of environments \
from bustling urban centers to tranquil forests and have developed a variety of unique \
behaviors that continue to intrigue scientists and nature enthusiasts alike.\n\
\n\
Master Tree Climbers\n\
At the heart of a squirrel's skill set is its impressive ability to navigate trees with ease. \
Whether they're darting from branch to branch or leaping across wide gaps, squirrels possess \
an innate talent for acrobatics. Their powerful hind legs, which are longer than their front \
legs, give them remarkable jumping power.",
    },
    Document {
        title: "Lorem Ipsum",
        contents: "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud \
exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in \
reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur sint \
occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id est \
laborum.",
    },
    Document {
        title: "Vacuum Instructions",
        contents: "Chapter 3: Getting Started - Unpacking and Setup\n\
\n\
Congratulations on your new SuperClean Pro 5000 vacuum cleaner! In this section, we will guide \
you through the simple steps to get your vacuum up and running. Before you begin, please \
ensure that you have all the components listed in the Package Contents section on page 2.",
    },
    Document {
        title: "Article 4",
        contents: "Article 4",
    },
    Document {
        title: "Article 5",
        contents: "Article 5",
    },
];

/// Index of the selected document, kept in range of [`DOCUMENTS`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection(usize);

impl Selection {
    pub fn index(self) -> usize {
        self.0
    }

    pub fn select(&mut self, index: usize) {
        if index < DOCUMENTS.len() {
            self.0 = index;
        } else {
            log::warn!("document index {index} out of range");
        }
    }

    pub fn document(self) -> &'static Document {
        &DOCUMENTS[self.0.min(DOCUMENTS.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_ignores_out_of_range() {
        let mut selection = Selection::default();
        selection.select(2);
        assert_eq!(selection.document().title, "Vacuum Instructions");
        selection.select(DOCUMENTS.len());
        assert_eq!(selection.index(), 2);
    }
}

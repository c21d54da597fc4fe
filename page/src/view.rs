//! Structured view model.
//!
//! Render functions return a [`Fragment`], a plain tree of [`Element`]s.
//! Tests assert on it directly; a browser host would turn it into markup.

use serde::Serialize;

/// Dashboard interaction attached to an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "intent", content = "query", rename_all = "snake_case")]
pub enum Intent {
    /// "Add word" quick action
    AddWord,
    /// "View vocabulary" quick action
    ViewVocabulary,
    /// "Practice" quick action
    Practice,
    /// Vocabulary search; the element carries an empty query and the
    /// submitted text fills it in.
    Search(String),
}

impl Intent {
    /// Human-readable name, used in notices.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AddWord => "Add word",
            Self::ViewVocabulary => "View vocabulary",
            Self::Practice => "Practice",
            Self::Search(_) => "Search",
        }
    }

    /// Fill in event payload (search text); other intents ignore it.
    #[must_use]
    pub fn with_payload(self, payload: Option<String>) -> Self {
        match self {
            Self::Search(query) => Self::Search(payload.unwrap_or(query)),
            other => other,
        }
    }
}

/// What an element is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    /// Grouping element
    Container,
    /// Title text
    Heading,
    /// Plain text
    Text,
    /// Navigation to another page
    Link {
        /// Target
        href: String,
    },
    /// Clickable control
    Button,
    /// Picture
    Image {
        /// Source URL
        src: String,
        /// Alternative text
        alt: String,
    },
    /// Single-line text entry, submitted with Enter
    Input {
        /// Hint shown while empty
        placeholder: String,
    },
    /// Dismissable banner
    Notice {
        /// `info`, `success` or `error`
        level: String,
    },
}

/// One node of a [`Fragment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    /// Addressable id, unique within the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Element kind.
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Text content of this element alone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Child elements, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
    /// Dashboard interaction bound to this element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
}

impl Element {
    /// Bare element of `kind`.
    #[must_use]
    pub const fn new(kind: ElementKind) -> Self {
        Self {
            id: None,
            kind,
            text: None,
            children: Vec::new(),
            intent: None,
        }
    }

    /// Grouping element with `id`.
    #[must_use]
    pub fn container(id: &str) -> Self {
        Self::new(ElementKind::Container).with_id(id)
    }

    /// Text element.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Text).with_text(text)
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attach a dashboard interaction.
    #[must_use]
    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Self>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }
}

/// A renderable subtree: zero or more top-level elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Fragment {
    /// Top-level elements.
    pub elements: Vec<Element>,
}

impl Fragment {
    /// Fragment holding a single root element.
    #[must_use]
    pub fn single(root: Element) -> Self {
        Self {
            elements: vec![root],
        }
    }

    /// Returns `true` if there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements, depth-first in document order.
    #[must_use]
    pub fn iter(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        for element in &self.elements {
            element.walk(&mut out);
        }
        out
    }

    /// Element with `id`, if present.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Element> {
        self.iter()
            .into_iter()
            .find(|element| element.id.as_deref() == Some(id))
    }

    /// Returns `true` if an element with `id` exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Ids of every addressable element.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.iter()
            .into_iter()
            .filter_map(|element| element.id.as_deref())
            .collect()
    }

    /// Concatenated text of every element, space separated.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.iter()
            .into_iter()
            .filter_map(|element| element.text.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Elements carrying an intent, with their ids.
    #[must_use]
    pub fn intents(&self) -> Vec<(&str, &Intent)> {
        self.iter()
            .into_iter()
            .filter_map(|element| Some((element.id.as_deref()?, element.intent.as_ref()?)))
            .collect()
    }
}

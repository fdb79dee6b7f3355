//! Session label history.

use serde::{Deserialize, Serialize};

/// Previously used label strings, kept as an explicit ordered set
/// (deduplicated, first-use order) instead of riding on map insertion order.
///
/// The YOLO class index of a label is its position in this list, so the
/// list is strictly append-only: inserting anywhere else would renumber the
/// classes of annotation files already saved this session. The alphabetized
/// view for combo lists is [`sorted_labels`].
///
/// Not persisted as annotation data (only implicitly via the files
/// themselves or a predefined-classes list).
///
/// [`sorted_labels`]: LabelHistory::sorted_labels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelHistory {
    labels: Vec<String>,
}

impl LabelHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the history from a predefined-classes list. For YOLO the class
    /// index is the position in this list, so seeded order is preserved
    /// as-is rather than sorted.
    pub fn from_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = Vec::new();
        for class in classes {
            let class = class.into();
            if !class.is_empty() && !labels.contains(&class) {
                labels.push(class);
            }
        }
        Self { labels }
    }

    /// Record a label, appending it if new. Returns `true` if the label was
    /// new. Existing labels keep their positions, and with them their YOLO
    /// class indices.
    pub fn record(&mut self, label: &str) -> bool {
        if label.is_empty() || self.contains(label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Class index of a label, used by the YOLO codec.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Label at a class index, used when resolving YOLO records.
    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Alphabetized view for quick-select UI lists. Class indices always
    /// come from [`labels`](LabelHistory::labels), never from this.
    pub fn sorted_labels(&self) -> Vec<&str> {
        let mut sorted: Vec<&str> = self.labels.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

use hashbrown::HashSet;

/// Detector labels treated as navigation hazards indoors.
pub const DEFAULT_OBSTACLE_CLASSES: [&str; 15] = [
    "person",
    "chair",
    "bench",
    "sofa",
    "bed",
    "dining table",
    "tv",
    "laptop",
    "backpack",
    "handbag",
    "suitcase",
    "bottle",
    "cup",
    "book",
    "potted plant",
];

/// Set of class names that can block a lane. Other labels are ignored
/// regardless of confidence or geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleClassSet(HashSet<String>);

impl ObstacleClassSet {
    pub fn new<I, S>(class_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(class_names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.0.contains(class_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Class names in a stable order, for logging.
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.0.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ObstacleClassSet {
    fn default() -> Self {
        Self::new(DEFAULT_OBSTACLE_CLASSES)
    }
}

impl<S: Into<String>> FromIterator<S> for ObstacleClassSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

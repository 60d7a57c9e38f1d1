//! minabot-avatar/src/catalog.rs
//!
//! Static grouping of motion groups into semantic categories, plus the
//! group -> clip-file table used to resolve playback requests. Immutable
//! after construction.

use std::collections::HashMap;

use minabot_common::models::MotionCategory;
use minabot_common::traits::MotionRng;

pub struct MotionCatalog {
    /// Group id -> ordered clip files, as declared by the model config.
    groups: HashMap<String, Vec<String>>,
    /// Category -> ordered group ids.
    categories: HashMap<MotionCategory, Vec<String>>,
}

impl MotionCatalog {
    pub fn new(
        groups: HashMap<String, Vec<String>>,
        categories: HashMap<MotionCategory, Vec<String>>,
    ) -> Self {
        Self { groups, categories }
    }

    /// The stock classification shipped with the default model.
    pub fn default_categories() -> HashMap<MotionCategory, Vec<String>> {
        let mut categories = HashMap::new();
        categories.insert(
            MotionCategory::Idle,
            vec!["idle", "main_1", "main_2", "main_3"],
        );
        categories.insert(
            MotionCategory::Touch,
            vec!["touch_head", "touch_body", "touch_special"],
        );
        categories.insert(
            MotionCategory::Special,
            vec!["login", "home", "wedding", "mail", "mission"],
        );
        categories.insert(
            MotionCategory::Complete,
            vec!["complete", "mission_complete"],
        );
        categories
            .into_iter()
            .map(|(k, v)| (k, v.into_iter().map(String::from).collect()))
            .collect()
    }

    /// Catalog whose groups each map to a single clip file derived from the
    /// group name. Used when no model config is available.
    pub fn with_default_groups() -> Self {
        let categories = Self::default_categories();
        let groups = categories
            .values()
            .flatten()
            .map(|g| (g.clone(), vec![format!("motion/{g}.motion3.json")]))
            .collect();
        Self { groups, categories }
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.get(group).is_some_and(|c| !c.is_empty())
    }

    /// Ordered clip files for a group; `None` when the group is absent or
    /// empty (callers treat both the same way).
    pub fn clips_for(&self, group: &str) -> Option<&[String]> {
        match self.groups.get(group) {
            Some(clips) if !clips.is_empty() => Some(clips.as_slice()),
            _ => None,
        }
    }

    pub fn groups_in(&self, category: MotionCategory) -> &[String] {
        self.categories
            .get(&category)
            .map(|g| g.as_slice())
            .unwrap_or(&[])
    }

    /// Uniform pick of one group id within a category.
    pub fn random_group_in(&self, category: MotionCategory, rng: &dyn MotionRng) -> Option<&str> {
        let groups = self.groups_in(category);
        if groups.is_empty() {
            return None;
        }
        Some(groups[rng.pick(groups.len())].as_str())
    }
}

impl Default for MotionCatalog {
    fn default() -> Self {
        Self::with_default_groups()
    }
}

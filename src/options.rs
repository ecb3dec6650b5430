use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(usize);

impl OptionId {
    /// Position in registration order, usable to index per-control storage.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Single,
    Multi,
}

/// Typed descriptor for one option control, resolved once at setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescriptor {
    pub group: GroupId,
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub mode: SelectionMode,
    pub options: Vec<OptionId>,
}

/// One generated `<input type="hidden">`, identified by name and value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HiddenField {
    pub name: String,
    pub value: String,
}

impl HiddenField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct OptionRegistry {
    groups: Vec<GroupDescriptor>,
    options: Vec<OptionDescriptor>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, mode: SelectionMode) -> GroupId {
        self.groups.push(GroupDescriptor {
            mode,
            options: Vec::new(),
        });
        GroupId(self.groups.len() - 1)
    }

    /// Panics if `group` was not issued by this registry.
    pub fn add_option(
        &mut self,
        group: GroupId,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> OptionId {
        let id = OptionId(self.options.len());
        self.options.push(OptionDescriptor {
            group,
            field: field.into(),
            value: value.into(),
        });
        self.groups[group.0].options.push(id);
        id
    }

    pub fn option(&self, id: OptionId) -> Option<&OptionDescriptor> {
        self.options.get(id.0)
    }

    pub fn group(&self, id: GroupId) -> Option<&GroupDescriptor> {
        self.groups.get(id.0)
    }

    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// What the form needs to do after a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEffect {
    SetField { name: String, value: String },
    AddHidden(HiddenField),
    RemoveHidden(HiddenField),
}

/// Result of a click on an option: new selected markers plus the form effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub group: GroupId,
    pub marks: Vec<(OptionId, bool)>,
    pub effect: FieldEffect,
}

/// Selection and form-field state for every option group on the page.
#[derive(Debug, Clone)]
pub struct FormState {
    registry: OptionRegistry,
    singles: BTreeMap<String, String>,
    records: BTreeSet<HiddenField>,
    selected: BTreeSet<OptionId>,
}

impl FormState {
    pub fn new(registry: OptionRegistry) -> Self {
        Self {
            registry,
            singles: BTreeMap::new(),
            records: BTreeSet::new(),
            selected: BTreeSet::new(),
        }
    }

    pub fn registry(&self) -> &OptionRegistry {
        &self.registry
    }

    pub fn is_selected(&self, id: OptionId) -> bool {
        self.selected.contains(&id)
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.singles.get(name).map(String::as_str)
    }

    pub fn hidden_fields(&self) -> &BTreeSet<HiddenField> {
        &self.records
    }

    pub fn hidden_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.records
            .iter()
            .filter(move |record| record.name == name)
            .map(|record| record.value.as_str())
    }

    /// Name/value pairs the form would submit: single fields, then hidden records.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        self.singles
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .chain(
                self.records
                    .iter()
                    .map(|record| (record.name.as_str(), record.value.as_str())),
            )
            .collect()
    }

    /// Applies a click on `id`. Returns `None` for an id this state never issued.
    pub fn select(&mut self, id: OptionId) -> Option<SelectionChange> {
        let option = self.registry.option(id)?.clone();
        let (mode, siblings) = self
            .registry
            .group(option.group)
            .map(|group| (group.mode, group.options.clone()))?;

        match mode {
            SelectionMode::Single => {
                for sibling in &siblings {
                    self.selected.remove(sibling);
                }
                self.selected.insert(id);
                self.singles
                    .insert(option.field.clone(), option.value.clone());

                Some(SelectionChange {
                    group: option.group,
                    marks: siblings
                        .into_iter()
                        .map(|sibling| (sibling, sibling == id))
                        .collect(),
                    effect: FieldEffect::SetField {
                        name: option.field,
                        value: option.value,
                    },
                })
            }
            SelectionMode::Multi => {
                let record = HiddenField::new(option.field, option.value);
                let now_selected = if self.selected.remove(&id) {
                    false
                } else {
                    self.selected.insert(id);
                    true
                };

                let effect = if now_selected {
                    self.records.insert(record.clone());
                    FieldEffect::AddHidden(record)
                } else {
                    // Another control in the page may carry the same name/value.
                    if !self.other_selected_with(id, &record) {
                        self.records.remove(&record);
                    }
                    FieldEffect::RemoveHidden(record)
                };

                Some(SelectionChange {
                    group: option.group,
                    marks: vec![(id, now_selected)],
                    effect,
                })
            }
        }
    }

    /// Adopts controls that were already marked selected in the markup.
    pub fn adopt<I>(&mut self, ids: I) -> Vec<SelectionChange>
    where
        I: IntoIterator<Item = OptionId>,
    {
        ids.into_iter()
            .filter_map(|id| {
                let multi = self
                    .registry
                    .option(id)
                    .and_then(|option| self.registry.group(option.group))
                    .map(|group| group.mode == SelectionMode::Multi)?;
                if multi && self.is_selected(id) {
                    return None;
                }
                self.select(id)
            })
            .collect()
    }

    fn other_selected_with(&self, id: OptionId, record: &HiddenField) -> bool {
        self.selected.iter().any(|other| {
            *other != id
                && self
                    .registry
                    .option(*other)
                    .map(|option| option.field == record.name && option.value == record.value)
                    .unwrap_or(false)
        })
    }
}

/// Steps needed to make a form's generated hidden inputs match `desired`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HiddenFieldPlan {
    /// Positions in the existing input list to remove.
    pub remove: Vec<usize>,
    pub add: Vec<HiddenField>,
}

impl HiddenFieldPlan {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }
}

/// Diffs the hidden inputs currently in the form against the desired records.
/// Strays and duplicates are removed; missing records are added.
pub fn plan_hidden_fields(
    existing: &[HiddenField],
    desired: &BTreeSet<HiddenField>,
) -> HiddenFieldPlan {
    let mut seen = BTreeSet::new();
    let mut plan = HiddenFieldPlan::default();

    for (index, field) in existing.iter().enumerate() {
        if !desired.contains(field) || !seen.insert(field) {
            plan.remove.push(index);
        }
    }

    plan.add = desired
        .iter()
        .filter(|field| !seen.contains(field))
        .cloned()
        .collect();

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Page {
        state: FormState,
        occasion: Vec<OptionId>,
        genres: Vec<OptionId>,
    }

    fn page() -> Page {
        let mut registry = OptionRegistry::new();

        let single = registry.add_group(SelectionMode::Single);
        let occasion = ["Movie date", "Solo watch", "Binge watch"]
            .into_iter()
            .map(|value| registry.add_option(single, "occasion", value))
            .collect();

        let multi = registry.add_group(SelectionMode::Multi);
        let genres = ["Action", "Thriller", "Drama"]
            .into_iter()
            .map(|value| registry.add_option(multi, "genres", value))
            .collect();

        Page {
            state: FormState::new(registry),
            occasion,
            genres,
        }
    }

    fn selected_in(state: &FormState, ids: &[OptionId]) -> Vec<OptionId> {
        ids.iter().copied().filter(|id| state.is_selected(*id)).collect()
    }

    #[test]
    fn single_select_replaces_previous_choice() {
        let Page {
            mut state,
            occasion,
            ..
        } = page();

        state.select(occasion[0]);
        let change = state.select(occasion[1]).unwrap();

        assert_eq!(selected_in(&state, &occasion), vec![occasion[1]]);
        assert_eq!(state.field_value("occasion"), Some("Solo watch"));
        assert_eq!(
            change.marks,
            vec![(occasion[0], false), (occasion[1], true), (occasion[2], false)]
        );
        assert_eq!(
            change.effect,
            FieldEffect::SetField {
                name: "occasion".into(),
                value: "Solo watch".into(),
            }
        );
    }

    #[test]
    fn reselecting_single_choice_is_idempotent() {
        let Page {
            mut state,
            occasion,
            ..
        } = page();

        let first = state.select(occasion[2]).unwrap();
        let entries_before: Vec<(String, String)> = state
            .entries()
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        let second = state.select(occasion[2]).unwrap();
        let entries_after: Vec<(String, String)> = state
            .entries()
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();

        assert_eq!(first, second);
        assert_eq!(entries_before, entries_after);
        assert_eq!(selected_in(&state, &occasion), vec![occasion[2]]);
    }

    #[test]
    fn multi_select_tracks_hidden_records() {
        let Page {
            mut state, genres, ..
        } = page();

        state.select(genres[0]);
        state.select(genres[1]);
        let change = state.select(genres[0]).unwrap();

        assert_eq!(
            change.effect,
            FieldEffect::RemoveHidden(HiddenField::new("genres", "Action"))
        );
        assert_eq!(change.marks, vec![(genres[0], false)]);
        assert_eq!(selected_in(&state, &genres), vec![genres[1]]);
        assert_eq!(state.hidden_values("genres").collect::<Vec<_>>(), vec!["Thriller"]);
        assert_eq!(state.hidden_fields().len(), 1);
    }

    #[test]
    fn entries_list_singles_then_hidden_records() {
        let Page {
            mut state,
            occasion,
            genres,
        } = page();

        state.select(genres[2]);
        state.select(occasion[0]);
        state.select(genres[0]);

        assert_eq!(
            state.entries(),
            vec![
                ("occasion", "Movie date"),
                ("genres", "Action"),
                ("genres", "Drama"),
            ]
        );
    }

    #[test]
    fn duplicate_multi_controls_keep_record_until_both_cleared() {
        let mut registry = OptionRegistry::new();
        let group = registry.add_group(SelectionMode::Multi);
        let first = registry.add_option(group, "genres", "Horror");
        let second = registry.add_option(group, "genres", "Horror");
        let mut state = FormState::new(registry);

        state.select(first);
        state.select(second);
        state.select(first);
        assert_eq!(state.hidden_fields().len(), 1);

        state.select(second);
        assert!(state.hidden_fields().is_empty());
    }

    #[test]
    fn unknown_option_is_ignored() {
        let mut state = FormState::new(OptionRegistry::new());
        assert_eq!(state.select(OptionId(7)), None);
    }

    #[test]
    fn adopt_keeps_markup_preselection() {
        let Page {
            mut state,
            occasion,
            genres,
        } = page();

        let changes = state.adopt([occasion[0], occasion[1], genres[1], genres[1]]);

        assert_eq!(changes.len(), 3);
        assert_eq!(selected_in(&state, &occasion), vec![occasion[1]]);
        assert_eq!(selected_in(&state, &genres), vec![genres[1]]);
        assert_eq!(state.field_value("occasion"), Some("Solo watch"));
    }

    #[test]
    fn plan_removes_strays_and_duplicates() {
        let desired: BTreeSet<_> = [
            HiddenField::new("genres", "Action"),
            HiddenField::new("genres", "Drama"),
        ]
        .into_iter()
        .collect();
        let existing = vec![
            HiddenField::new("genres", "Action"),
            HiddenField::new("genres", "Comedy"),
            HiddenField::new("genres", "Action"),
        ];

        let plan = plan_hidden_fields(&existing, &desired);

        assert_eq!(plan.remove, vec![1, 2]);
        assert_eq!(plan.add, vec![HiddenField::new("genres", "Drama")]);
    }

    #[test]
    fn plan_is_empty_when_form_matches() {
        let desired: BTreeSet<_> = [HiddenField::new("genres", "Crime")].into_iter().collect();
        let existing = vec![HiddenField::new("genres", "Crime")];
        assert!(plan_hidden_fields(&existing, &desired).is_empty());
    }
}

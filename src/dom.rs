//! Browser binding: attaches listeners to the server-rendered page and
//! projects core state back onto it as class toggles and form inputs.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo_events::EventListener;
use log::{debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, NodeList};

use crate::config::{PageConfig, CONFIG_ELEMENT_ID};
use crate::error::BindError;
use crate::flow::FlowMode;
use crate::navigator::{Navigator, Transition};
use crate::options::{
    plan_hidden_fields, FieldEffect, FormState, GroupId, HiddenField, OptionId,
    OptionRegistry, SelectionChange, SelectionMode,
};

const VALUE_ATTRIBUTE: &str = "data-value";

/// Listeners bound for this page view. Dropping it detaches them.
pub struct Page {
    pub mode: FlowMode,
    listeners: Vec<EventListener>,
}

impl Page {
    /// Keeps every listener attached for the rest of the page lifetime.
    pub fn forget(self) {
        for listener in self.listeners {
            listener.forget();
        }
    }
}

pub fn document() -> Result<Document, BindError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or(BindError::NoWindow)
}

pub fn embedded_config(document: &Document) -> Option<String> {
    document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.text_content())
}

pub fn mount(document: &Document, config: &PageConfig) -> Result<Page, BindError> {
    let results = query_all(document, &config.result_selector)?;
    let mode = FlowMode::detect(results.len());
    info!("Mounting {:?} flow ({} result cards)", mode, results.len());

    apply_mode(document, config, mode);

    let listeners = match mode {
        FlowMode::Movies => bind_movies(document, config, results)?,
        FlowMode::Wizard => {
            let mut listeners = bind_wizard(document, config)?;
            listeners.extend(bind_options(document, config)?);
            listeners
        }
    };

    Ok(Page { mode, listeners })
}

fn apply_mode(document: &Document, config: &PageConfig, mode: FlowMode) {
    let Some((input_display, movie_display)) = mode.display_overrides() else {
        return;
    };

    for (id, display) in [
        (&config.input_flow_id, input_display),
        (&config.movie_flow_id, movie_display),
    ] {
        match document
            .get_element_by_id(id)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        {
            Some(element) => {
                let _ = element.style().set_property("display", display);
            }
            None => warn!("Flow container #{} not found", id),
        }
    }
}

/// A run of cards whose active marker follows a [`Navigator`].
struct Cards {
    elements: Vec<Element>,
    navigator: Navigator,
    active_class: String,
}

impl Cards {
    fn bind(elements: Vec<Element>, active_class: &str) -> Option<Self> {
        let navigator = Navigator::with_active(
            elements
                .iter()
                .map(|element| element.class_list().contains(active_class)),
        )?;

        let cards = Self {
            elements,
            navigator,
            active_class: active_class.to_owned(),
        };
        for (index, element) in cards.elements.iter().enumerate() {
            let _ = element
                .class_list()
                .toggle_with_force(&cards.active_class, cards.navigator.is_active(index));
        }
        Some(cards)
    }

    fn advance(&mut self) {
        let transition = self.navigator.advance();
        self.apply(transition);
    }

    fn retreat(&mut self) {
        let transition = self.navigator.retreat();
        self.apply(transition);
    }

    fn apply(&self, transition: Option<Transition>) {
        let Some(Transition { from, to }) = transition else {
            return;
        };
        if let Some(element) = self.elements.get(from) {
            let _ = element.class_list().remove_1(&self.active_class);
        }
        if let Some(element) = self.elements.get(to) {
            let _ = element.class_list().add_1(&self.active_class);
        }
        debug!("Card {} -> {} of {}", from, to, self.navigator.len());
    }
}

fn bind_cards(
    cards: Cards,
    next_controls: &[Element],
    back_controls: &[Element],
) -> Vec<EventListener> {
    let cards = Rc::new(RefCell::new(cards));
    let mut listeners = Vec::with_capacity(next_controls.len() + back_controls.len());

    for control in next_controls {
        let cards = cards.clone();
        listeners.push(EventListener::new(control, "click", move |_| {
            cards.borrow_mut().advance();
        }));
    }

    for control in back_controls {
        let cards = cards.clone();
        listeners.push(EventListener::new(control, "click", move |_| {
            cards.borrow_mut().retreat();
        }));
    }

    listeners
}

fn bind_wizard(document: &Document, config: &PageConfig) -> Result<Vec<EventListener>, BindError> {
    let steps = query_all(document, &config.step_selector)?;
    let Some(cards) = Cards::bind(steps, &config.active_class) else {
        warn!("No step cards match `{}`", config.step_selector);
        return Ok(Vec::new());
    };

    let next = query_all(document, &config.next_selector)?;
    let back = query_all(document, &config.back_selector)?;
    debug!(
        "Wizard bound: {} steps, {} next, {} back controls",
        cards.navigator.len(),
        next.len(),
        back.len()
    );

    Ok(bind_cards(cards, &next, &back))
}

fn bind_movies(
    document: &Document,
    config: &PageConfig,
    results: Vec<Element>,
) -> Result<Vec<EventListener>, BindError> {
    let Some(cards) = Cards::bind(results, &config.active_class) else {
        return Ok(Vec::new());
    };

    let next = control_by_id(document, &config.result_next_id);
    let prev = control_by_id(document, &config.result_prev_id);

    Ok(bind_cards(cards, next.as_slice(), prev.as_slice()))
}

fn control_by_id(document: &Document, id: &str) -> Option<Element> {
    let control = document.get_element_by_id(id);
    if control.is_none() {
        warn!("{}", BindError::MissingElement(format!("#{}", id)));
    }
    control
}

/// Option controls plus the form fields their state is projected onto.
struct OptionsView {
    document: Document,
    state: FormState,
    controls: Vec<Element>,
    fields: HashMap<String, HtmlInputElement>,
    form: Option<Element>,
    selected_class: String,
}

impl OptionsView {
    fn click(&mut self, id: OptionId) {
        match self.state.select(id) {
            Some(change) => self.apply(change),
            None => warn!("Click on unregistered option {:?}", id),
        }
    }

    fn apply(&self, change: SelectionChange) {
        for (id, selected) in &change.marks {
            if let Some(control) = self.controls.get(id.index()) {
                let _ = control
                    .class_list()
                    .toggle_with_force(&self.selected_class, *selected);
            }
        }

        match change.effect {
            FieldEffect::SetField { name, value } => match self.fields.get(&name) {
                Some(input) => input.set_value(&value),
                None => warn!("No input named `{}` to receive `{}`", name, value),
            },
            FieldEffect::AddHidden(_) | FieldEffect::RemoveHidden(_) => {
                if let Err(err) = self.sync_hidden_fields() {
                    warn!("Failed to sync hidden fields: {}", err);
                }
            }
        }
    }

    fn sync_hidden_fields(&self) -> Result<(), BindError> {
        let Some(form) = &self.form else {
            return Err(BindError::MissingElement("form".into()));
        };

        let selector = format!("input[type=\"hidden\"][{}]", VALUE_ATTRIBUTE);
        let inputs: Vec<HtmlInputElement> = form
            .query_selector_all(&selector)
            .map(elements)
            .map_err(|_| BindError::Selector(selector.clone()))?
            .into_iter()
            .filter_map(|element| element.dyn_into::<HtmlInputElement>().ok())
            .collect();

        let existing: Vec<HiddenField> = inputs
            .iter()
            .map(|input| {
                HiddenField::new(
                    input.name(),
                    input.get_attribute(VALUE_ATTRIBUTE).unwrap_or_default(),
                )
            })
            .collect();

        let plan = plan_hidden_fields(&existing, self.state.hidden_fields());
        for index in &plan.remove {
            if let Some(input) = inputs.get(*index) {
                input.remove();
            }
        }
        for field in &plan.add {
            let input = self
                .document
                .create_element("input")
                .map_err(BindError::dom)?
                .dyn_into::<HtmlInputElement>()
                .map_err(|_| BindError::Dom("created element is not an input".into()))?;
            input.set_type("hidden");
            input.set_name(&field.name);
            input.set_value(&field.value);
            input
                .set_attribute(VALUE_ATTRIBUTE, &field.value)
                .map_err(BindError::dom)?;
            form.append_child(&input).map_err(BindError::dom)?;
        }

        if !plan.is_empty() {
            debug!(
                "Hidden fields now {}",
                serde_json::to_string(self.state.hidden_fields()).unwrap_or_default()
            );
        }
        Ok(())
    }
}

fn bind_options(document: &Document, config: &PageConfig) -> Result<Vec<EventListener>, BindError> {
    let buttons = query_all(document, &config.option_selector)?;
    if buttons.is_empty() {
        return Ok(Vec::new());
    }

    let mut registry = OptionRegistry::new();
    let mut groups: Vec<(Option<Element>, GroupId)> = Vec::new();
    let mut controls = Vec::with_capacity(buttons.len());
    let mut ids = Vec::with_capacity(buttons.len());
    let mut preselected = Vec::new();
    let mut single_fields = Vec::new();

    for button in buttons {
        let Some(field) = button.get_attribute(&config.name_attribute) else {
            warn!("Option control without `{}` skipped", config.name_attribute);
            continue;
        };
        let value = button.get_attribute("value").unwrap_or_default();

        let parent = button.parent_element();
        let group = match groups.iter().find(|(element, _)| *element == parent) {
            Some((_, group)) => *group,
            None => {
                let multi = parent
                    .as_ref()
                    .map(|element| element.class_list().contains(&config.multi_class))
                    .unwrap_or(false);
                let mode = if multi {
                    SelectionMode::Multi
                } else {
                    SelectionMode::Single
                };
                let group = registry.add_group(mode);
                groups.push((parent, group));
                group
            }
        };

        let single = registry
            .group(group)
            .map(|descriptor| descriptor.mode == SelectionMode::Single)
            .unwrap_or(false);
        if single && !single_fields.contains(&field) {
            single_fields.push(field.clone());
        }

        let id = registry.add_option(group, field, value);
        if button.class_list().contains(&config.selected_class) {
            preselected.push(id);
        }
        ids.push(id);
        controls.push(button);
    }

    let mut fields = HashMap::new();
    for name in single_fields {
        let selector = format!("input[name=\"{}\"]", name);
        match document.query_selector(&selector) {
            Ok(Some(element)) => match element.dyn_into::<HtmlInputElement>() {
                Ok(input) => {
                    fields.insert(name, input);
                }
                Err(_) => warn!("`{}` is not an input element", selector),
            },
            Ok(None) => warn!("{}", BindError::MissingElement(selector)),
            Err(_) => return Err(BindError::Selector(selector)),
        }
    }

    let form = document.get_element_by_id(&config.form_id);
    if form.is_none() {
        warn!("{}", BindError::MissingElement(format!("#{}", config.form_id)));
    }

    debug!(
        "Options bound: {} controls in {} groups",
        registry.option_count(),
        registry.group_count()
    );

    let mut view = OptionsView {
        document: document.clone(),
        state: FormState::new(registry),
        controls,
        fields,
        form,
        selected_class: config.selected_class.clone(),
    };
    for change in view.state.adopt(preselected) {
        view.apply(change);
    }

    let targets: Vec<(OptionId, Element)> =
        ids.into_iter().zip(view.controls.iter().cloned()).collect();
    let view = Rc::new(RefCell::new(view));

    Ok(targets
        .into_iter()
        .map(|(id, control)| {
            let view = view.clone();
            EventListener::new(&control, "click", move |_| {
                view.borrow_mut().click(id);
            })
        })
        .collect())
}

fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, BindError> {
    document
        .query_selector_all(selector)
        .map(elements)
        .map_err(|_| BindError::Selector(selector.to_owned()))
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}
